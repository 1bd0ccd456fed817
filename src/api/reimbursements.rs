//! Reimbursement endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReimbursementType {
    Food,
    Airline,
    Gas,
    Hotel,
    Supplies,
    Other,
}

impl ReimbursementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReimbursementType::Food => "FOOD",
            ReimbursementType::Airline => "AIRLINE",
            ReimbursementType::Gas => "GAS",
            ReimbursementType::Hotel => "HOTEL",
            ReimbursementType::Supplies => "SUPPLIES",
            ReimbursementType::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ReimbursementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReimbursementStatus {
    Pending,
    Approved,
    Denied,
}

impl ReimbursementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReimbursementStatus::Pending => "PENDING",
            ReimbursementStatus::Approved => "APPROVED",
            ReimbursementStatus::Denied => "DENIED",
        }
    }
}

impl std::fmt::Display for ReimbursementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reimbursement {
    pub id: i64,
    pub user_id: i64,
    pub user_email: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ReimbursementType,
    pub status: ReimbursementStatus,
}

/// Body for creating or editing a reimbursement.
#[derive(Debug, Clone, Serialize)]
pub struct NewReimbursement {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ReimbursementType,
}

/// Manager decision on a pending reimbursement.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub status: ReimbursementStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ApiClient {
    pub async fn create_reimbursement(
        &self,
        body: &NewReimbursement,
    ) -> Result<Reimbursement, ApiError> {
        let req = self.request(Method::POST, "reimbursements")?.json(body);
        let created: Reimbursement = self
            .send_json(req, "Failed to create reimbursement")
            .await?;
        info!(id = created.id, "Reimbursement created");
        Ok(created)
    }

    /// Reimbursements of the signed-in user.
    pub async fn my_reimbursements(
        &self,
        status: Option<ReimbursementStatus>,
    ) -> Result<Vec<Reimbursement>, ApiError> {
        let req = with_status(self.request(Method::GET, "reimbursements/self")?, status);
        let list: Vec<Reimbursement> = self
            .send_json(req, "Failed to fetch reimbursements")
            .await?;
        debug!(count = list.len(), "Fetched own reimbursements");
        Ok(list)
    }

    /// Every reimbursement. Manager only.
    pub async fn all_reimbursements(
        &self,
        status: Option<ReimbursementStatus>,
    ) -> Result<Vec<Reimbursement>, ApiError> {
        let req = with_status(self.request(Method::GET, "reimbursements")?, status);
        let list: Vec<Reimbursement> = self
            .send_json(req, "Failed to fetch reimbursements")
            .await?;
        debug!(count = list.len(), "Fetched all reimbursements");
        Ok(list)
    }

    pub async fn reimbursement(&self, id: i64) -> Result<Reimbursement, ApiError> {
        let req = self.request(Method::GET, &format!("reimbursements/{}", id))?;
        self.send_json(req, "Failed to fetch reimbursement").await
    }

    /// Edit a reimbursement. Only pending ones can be edited.
    pub async fn update_reimbursement(
        &self,
        id: i64,
        body: &NewReimbursement,
    ) -> Result<Reimbursement, ApiError> {
        let req = self
            .request(Method::PUT, &format!("reimbursements/{}", id))?
            .json(body);
        self.send_json(req, "Failed to update reimbursement")
            .await
            .map_err(|e| e.refine(&[("pending", "Can only edit pending reimbursements")]))
    }

    pub async fn resolve_reimbursement(
        &self,
        id: i64,
        resolution: &Resolution,
    ) -> Result<Reimbursement, ApiError> {
        let req = self
            .request(Method::PUT, &format!("reimbursements/{}/resolve", id))?
            .json(resolution);
        let resolved: Reimbursement = self
            .send_json(req, "Failed to resolve reimbursement")
            .await
            .map_err(|e| {
                e.refine(&[
                    ("Only managers", "Only managers can resolve reimbursements"),
                    ("pending", "Can only resolve pending reimbursements"),
                ])
            })?;
        info!(id, status = %resolved.status, "Reimbursement resolved");
        Ok(resolved)
    }
}

fn with_status(
    req: reqwest::RequestBuilder,
    status: Option<ReimbursementStatus>,
) -> reqwest::RequestBuilder {
    match status {
        Some(status) => req.query(&[("status", status.as_str())]),
        None => req,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reimbursement_wire_shape() {
        let r: Reimbursement = serde_json::from_str(
            r#"{"id":4,"userId":2,"userEmail":"e@x.com","description":"Taxi","type":"GAS","status":"PENDING"}"#,
        )
        .unwrap();
        assert_eq!(r.kind, ReimbursementType::Gas);
        assert_eq!(r.status, ReimbursementStatus::Pending);

        let body = serde_json::to_value(NewReimbursement {
            description: "Dinner".to_string(),
            kind: ReimbursementType::Food,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"description": "Dinner", "type": "FOOD"}));
    }

    #[test]
    fn test_resolution_omits_empty_comment() {
        let body = serde_json::to_value(Resolution {
            status: ReimbursementStatus::Denied,
            comment: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"status": "DENIED"}));
    }
}
