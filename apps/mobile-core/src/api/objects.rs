//! Object (construction site) endpoints.

use serde::Serialize;
use sitedocs_common::{FinishedWork, ObjectSite, User};

use super::ApiClient;
use crate::error::ClientError;

#[derive(Debug, Serialize)]
struct NewObject<'a> {
    title: &'a str,
    address: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddWorker {
    worker_id: i64,
}

impl ApiClient {
    /// `GET /objects`: the sites visible to this account.
    pub async fn objects(&self) -> Result<Vec<ObjectSite>, ClientError> {
        self.authorized(|http| http.get(self.url("/objects"))).await
    }

    /// `POST /objects`: returns the created site.
    pub async fn create_object(
        &self,
        title: &str,
        address: &str,
    ) -> Result<ObjectSite, ClientError> {
        self.authorized(|http| {
            http.post(self.url("/objects"))
                .json(&NewObject { title, address })
        })
        .await
    }

    /// `DELETE /objects/:id`.
    pub async fn delete_object(&self, object_id: i64) -> Result<(), ClientError> {
        self.authorized_empty(|http| http.delete(self.url(&format!("/objects/{object_id}"))))
            .await
    }

    /// `GET /objects/:id/workers`: accounts assigned to the site.
    pub async fn object_workers(&self, object_id: i64) -> Result<Vec<User>, ClientError> {
        self.authorized(|http| http.get(self.url(&format!("/objects/{object_id}/workers"))))
            .await
    }

    /// `POST /objects/:id/workers`.
    pub async fn add_object_worker(
        &self,
        object_id: i64,
        worker_id: i64,
    ) -> Result<(), ClientError> {
        self.authorized_empty(|http| {
            http.post(self.url(&format!("/objects/{object_id}/workers")))
                .json(&AddWorker { worker_id })
        })
        .await
    }

    /// `DELETE /objects/:id/workers/:worker_id`.
    pub async fn remove_object_worker(
        &self,
        object_id: i64,
        worker_id: i64,
    ) -> Result<(), ClientError> {
        self.authorized_empty(|http| {
            http.delete(self.url(&format!("/objects/{object_id}/workers/{worker_id}")))
        })
        .await
    }

    /// `GET /objects/:id/finished-works`: confirmed rows for the site.
    pub async fn finished_works(&self, object_id: i64) -> Result<Vec<FinishedWork>, ClientError> {
        self.authorized(|http| http.get(self.url(&format!("/objects/{object_id}/finished-works"))))
            .await
    }
}
