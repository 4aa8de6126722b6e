//! Sharing endpoints: recipients, sent/received works, review, export.

use serde::Serialize;
use sitedocs_common::{HistoryWork, ReceivedWork, Recipient, WorkItem};

use super::ApiClient;
use crate::error::ClientError;

/// Review verdict for a shared work record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Sent,
    Accepted,
}

#[derive(Debug, Serialize)]
struct NewRecipient<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct SendWorks<'a> {
    recipient_id: i64,
    work_ids: &'a [i64],
}

#[derive(Debug, Serialize)]
struct AssignObject<'a> {
    work_ids: &'a [i64],
    object_id: i64,
}

#[derive(Debug, Serialize)]
struct StatusChange {
    status: ReviewStatus,
}

#[derive(Debug, Serialize)]
struct WorkFields<'a> {
    title: &'a str,
    unit: &'a str,
    quantity: f64,
}

#[derive(Debug, Serialize)]
struct ExportRequest {
    object_id: i64,
}

/// One line of a bill of quantities. The site's import expects quantities as
/// strings.
#[derive(Debug, Clone, Serialize)]
pub struct BillbookRow {
    pub name: String,
    pub unit: String,
    pub quantity: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BillbookRequest<'a> {
    user_id: i64,
    title: &'a str,
    rows: &'a [BillbookRow],
}

impl ApiClient {
    /// `GET /recipients`: saved sharing contacts.
    pub async fn recipients(&self) -> Result<Vec<Recipient>, ClientError> {
        self.authorized(|http| http.get(self.url("/recipients")))
            .await
    }

    /// `POST /recipients`: returns the saved contact, whose id can be used
    /// to send in the same flow.
    pub async fn add_recipient(&self, email: &str) -> Result<Recipient, ClientError> {
        self.authorized(|http| http.post(self.url("/recipients")).json(&NewRecipient { email }))
            .await
    }

    /// `POST /sendworks`: share pending works with a recipient.
    pub async fn send_works(&self, recipient_id: i64, work_ids: &[i64]) -> Result<(), ClientError> {
        self.authorized_empty(|http| {
            http.post(self.url("/sendworks")).json(&SendWorks {
                recipient_id,
                work_ids,
            })
        })
        .await
    }

    /// `GET /sendworks/received`: records shared to this account.
    pub async fn received_works(&self) -> Result<Vec<ReceivedWork>, ClientError> {
        self.authorized(|http| http.get(self.url("/sendworks/received")))
            .await
    }

    /// `PUT /sendworks/assign-object`: attach received records to a site.
    pub async fn assign_object(&self, work_ids: &[i64], object_id: i64) -> Result<(), ClientError> {
        self.authorized_empty(|http| {
            http.put(self.url("/sendworks/assign-object"))
                .json(&AssignObject {
                    work_ids,
                    object_id,
                })
        })
        .await
    }

    /// `GET /sendworks?object_id=`: records under review for a site.
    pub async fn object_send_works(&self, object_id: i64) -> Result<Vec<WorkItem>, ClientError> {
        self.authorized(|http| {
            http.get(self.url("/sendworks"))
                .query(&[("object_id", object_id)])
        })
        .await
    }

    /// `PUT /sendworks/:id/status`: accept a record or put it back to sent.
    pub async fn set_work_status(
        &self,
        work_id: i64,
        status: ReviewStatus,
    ) -> Result<(), ClientError> {
        self.authorized_empty(|http| {
            http.put(self.url(&format!("/sendworks/{work_id}/status")))
                .json(&StatusChange { status })
        })
        .await
    }

    /// `PUT /sendworks/:id`: edit a shared record before acceptance.
    pub async fn update_sent_work(
        &self,
        work_id: i64,
        title: &str,
        unit: &str,
        quantity: f64,
    ) -> Result<(), ClientError> {
        self.authorized_empty(|http| {
            http.put(self.url(&format!("/sendworks/{work_id}")))
                .json(&WorkFields {
                    title,
                    unit,
                    quantity,
                })
        })
        .await
    }

    /// `POST /sendworks/export`: move a site's accepted records into the
    /// billing pipeline.
    pub async fn export_works(&self, object_id: i64) -> Result<(), ClientError> {
        self.authorized_empty(|http| {
            http.post(self.url("/sendworks/export"))
                .json(&ExportRequest { object_id })
        })
        .await
    }

    /// `GET /sendworks/history`: everything this account has sent.
    pub async fn sent_history(&self) -> Result<Vec<HistoryWork>, ClientError> {
        self.authorized(|http| http.get(self.url("/sendworks/history")))
            .await
    }

    /// `POST /savebillbook`: save a bill of quantities on the site backend.
    pub async fn save_billbook(
        &self,
        user_id: i64,
        title: &str,
        rows: &[BillbookRow],
    ) -> Result<(), ClientError> {
        self.authorized_empty(|http| {
            http.post(self.url("/savebillbook")).json(&BillbookRequest {
                user_id,
                title,
                rows,
            })
        })
        .await
    }
}
