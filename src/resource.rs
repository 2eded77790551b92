//! Typed CRUD over API collections.
//!
//! A [`Resource`] knows which collection it lives in and how to identify
//! itself; the [`Session`] methods here turn that into the REST calls.
//!
//! | Call | Request |
//! |------|---------|
//! | [`Session::list`] | `GET {name}` |
//! | [`Session::matching`] | `POST {name}/match` |
//! | [`Session::sample`] | `GET {name}/sample` |
//! | [`Session::read`] | `GET {name}/{id}` |
//! | [`Session::create`] | `POST {name}` |
//! | [`Session::update`] | `PUT {name}/{id}` |
//! | [`Session::apply_patch`] | `PATCH {name}/{id}` |
//! | [`Session::destroy`] | `DELETE {name}/{id}` |

use crate::session::Session;
use crate::{Error, Result};

use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// An object stored in one API collection
pub trait Resource: Serialize + DeserializeOwned {
    /// Collection path segment, e.g. `"nodes"`
    fn api_name() -> &'static str;

    /// Server-side identifier, if this object has been saved or named
    fn id(&self) -> Option<String>;

    /// Point this object at an existing server-side identifier
    fn set_id(&mut self, id: &str) -> Result<()>;

    /// Path of this object relative to the API prefix
    fn path(&self) -> Result<String> {
        match self.id() {
            Some(id) => Ok(format!("{}/{}", Self::api_name(), id)),
            None => Err(Error::MissingId(Self::api_name())),
        }
    }
}

impl Session {
    /// Every object in `R`'s collection
    pub async fn list<R: Resource>(&self) -> Result<Vec<R>> {
        self.fetch(R::api_name()).await
    }

    /// Objects matching the field values in `template`
    pub async fn matching<R, M>(&self, template: &M) -> Result<Vec<R>>
    where
        R: Resource,
        M: Serialize + ?Sized,
    {
        let mut found: Vec<R> = Vec::new();
        let path = format!("{}/match", R::api_name());
        self.request(Method::POST, &path, Some(template), Some(&mut found))
            .await?;
        Ok(found)
    }

    /// A new object populated with the server's default values
    pub async fn sample<R: Resource>(&self) -> Result<R> {
        self.fetch(&format!("{}/sample", R::api_name())).await
    }

    /// Reload `obj` from the server by its id
    pub async fn read<R: Resource>(&self, obj: &mut R) -> Result<()> {
        let path = obj.path()?;
        self.get(obj, &path).await
    }

    /// Create `obj`; on return it holds the stored object, id included
    pub async fn create<R: Resource>(&self, obj: &mut R) -> Result<()> {
        self.post(obj, R::api_name()).await
    }

    /// Replace the stored object with `obj`
    pub async fn update<R: Resource>(&self, obj: &mut R) -> Result<()> {
        let path = obj.path()?;
        self.put(obj, &path).await
    }

    /// Apply a JSON-patch document to the stored object and reload `obj` from the result
    pub async fn apply_patch<R, P>(&self, obj: &mut R, patch: &P) -> Result<()>
    where
        R: Resource,
        P: Serialize + ?Sized,
    {
        let path = obj.path()?;
        self.patch(obj, &path, patch).await
    }

    pub async fn destroy<R: Resource>(&self, obj: &R) -> Result<()> {
        self.delete(&obj.path()?).await
    }
}
