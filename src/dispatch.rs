use crate::authorization::authorize;
use crate::session::{request_uri, www_authenticate, Session};
use crate::{Error, Result};

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// How many times a 401 may be answered with a fresh challenge within one dispatch
pub const MAX_REAUTH: u32 = 1;

const JSON: &str = "application/json";

/// Status, headers and fully read body of a successful exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Session {
    /// Send one authenticated request and return the raw response.
    ///
    /// `path` is relative to the API prefix. A 401 makes the session absorb the
    /// new challenge and retry, at most [`MAX_REAUTH`] times.
    ///
    /// # Errors
    /// `AuthenticationFailed` once the retry budget is spent, `MalformedChallenge`
    /// for a 401 without a usable digest challenge (not retried), `UnexpectedStatus`
    /// for any other status of 300 or above.
    pub async fn dispatch<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let payload = match body {
            Some(b) => Some(serde_json::to_vec(b)?),
            None => None,
        };
        let url = self.request_url(path)?;
        let uri = request_uri(&url);

        // Held until the response is read, so no two requests share a nonce count
        let mut challenge = self.challenge.lock().await;
        let mut reauths = 0;

        loop {
            let auth = authorize(&mut challenge, method.as_str(), &uri)?;
            tracing::debug!(%method, %uri, nc = challenge.nonce_count, "dispatching request");

            let mut req = self
                .client
                .request(method.clone(), url.clone())
                .header(AUTHORIZATION, auth)
                .header(CONTENT_TYPE, JSON)
                .header(ACCEPT, JSON)
                .header(USER_AGENT, &self.config.user_agent);
            if let Some(timeout) = self.config.request_timeout {
                req = req.timeout(timeout);
            }
            if let Some(payload) = &payload {
                req = req.body(payload.clone());
            }

            let resp = req.send().await?;
            let status = resp.status();
            let headers = resp.headers().clone();
            let body = resp.bytes().await?.to_vec();

            if status == StatusCode::UNAUTHORIZED {
                if reauths >= MAX_REAUTH {
                    // keep the newest nonce for whoever calls next
                    if let Err(e) = www_authenticate(&headers).and_then(|v| challenge.parse_into(v)) {
                        tracing::debug!(%method, %uri, error = %e, "ignoring unusable final challenge");
                    }
                    tracing::warn!(%method, %uri, "server rejected re-challenged request");
                    return Err(Error::AuthenticationFailed { uri });
                }
                challenge.parse_into(www_authenticate(&headers)?)?;
                reauths += 1;
                tracing::debug!(%method, %uri, stale = %challenge.stale, "re-challenged, retrying");
                continue;
            }

            if status.as_u16() >= 300 {
                return Err(Error::UnexpectedStatus {
                    code: status,
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
            }

            return Ok(RawResponse { status, headers, body });
        }
    }

    /// Dispatch and, if `target` is given, decode the JSON response into it
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        target: Option<&mut T>,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.dispatch(method, path, body).await?;
        if let Some(target) = target {
            *target = decode(&resp)?;
        }
        Ok(())
    }

    /// GET `path` into `target`
    pub async fn get<T: DeserializeOwned>(&self, target: &mut T, path: &str) -> Result<()> {
        self.request::<(), T>(Method::GET, path, None, Some(target)).await
    }

    /// GET `path` as a new value
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.dispatch::<()>(Method::GET, path, None).await?;
        decode(&resp)
    }

    /// POST `obj` to `path`; `obj` is replaced by the server's representation
    pub async fn post<T>(&self, obj: &mut T, path: &str) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        self.send_in_place(Method::POST, obj, path).await
    }

    /// PUT `obj` to `path`; `obj` is replaced by the server's representation
    pub async fn put<T>(&self, obj: &mut T, path: &str) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        self.send_in_place(Method::PUT, obj, path).await
    }

    /// PATCH `path` with a JSON-patch document; `obj` is replaced by the result
    pub async fn patch<T, P>(&self, obj: &mut T, path: &str, patch: &P) -> Result<()>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(patch), Some(obj)).await
    }

    /// DELETE `path`, ignoring any response body
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.dispatch::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn send_in_place<T>(&self, method: Method, obj: &mut T, path: &str) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let resp = self.dispatch(method, path, Some(&*obj)).await?;
        *obj = decode(&resp)?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(resp: &RawResponse) -> Result<T> {
    serde_json::from_slice(&resp.body).map_err(|_| Error::DecodeError {
        status: resp.status,
        body: resp.text(),
    })
}
