//! Worker roster and pending-work endpoints.

use serde::Serialize;
use sitedocs_common::{User, WorkItem};

use super::ApiClient;
use crate::error::ClientError;

#[derive(Debug, Serialize)]
struct NewWorker<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct WorkFields<'a> {
    title: &'a str,
    unit: &'a str,
    quantity: f64,
}

impl ApiClient {
    /// `GET /workers`: the foreman's roster.
    pub async fn workers(&self) -> Result<Vec<User>, ClientError> {
        self.authorized(|http| http.get(self.url("/workers"))).await
    }

    /// `POST /workers`: link a worker to this foreman by account email.
    pub async fn add_worker(&self, email: &str) -> Result<(), ClientError> {
        self.authorized_empty(|http| http.post(self.url("/workers")).json(&NewWorker { email }))
            .await
    }

    /// `DELETE /workers/:id`.
    pub async fn remove_worker(&self, worker_id: i64) -> Result<(), ClientError> {
        self.authorized_empty(|http| http.delete(self.url(&format!("/workers/{worker_id}"))))
            .await
    }

    /// `GET /pendingworks`: this account's not-yet-sent records.
    pub async fn pending_works(&self) -> Result<Vec<WorkItem>, ClientError> {
        self.authorized(|http| http.get(self.url("/pendingworks")))
            .await
    }

    /// `POST /pendingworks`.
    pub async fn create_pending_work(
        &self,
        title: &str,
        unit: &str,
        quantity: f64,
    ) -> Result<(), ClientError> {
        self.authorized_empty(|http| {
            http.post(self.url("/pendingworks")).json(&WorkFields {
                title,
                unit,
                quantity,
            })
        })
        .await
    }

    /// `PUT /pendingworks/:id`: returns the updated record.
    pub async fn update_pending_work(
        &self,
        work_id: i64,
        title: &str,
        unit: &str,
        quantity: f64,
    ) -> Result<WorkItem, ClientError> {
        self.authorized(|http| {
            http.put(self.url(&format!("/pendingworks/{work_id}")))
                .json(&WorkFields {
                    title,
                    unit,
                    quantity,
                })
        })
        .await
    }

    /// `DELETE /pendingworks/:id`.
    pub async fn delete_pending_work(&self, work_id: i64) -> Result<(), ClientError> {
        self.authorized_empty(|http| http.delete(self.url(&format!("/pendingworks/{work_id}"))))
            .await
    }
}
