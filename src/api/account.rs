//! Account endpoints: sessions, saved deals and alerts.
//!
//! Everything except login/register needs a bearer token.

use serde_json::json;

use super::client::{send, send_json};
use super::{ApiError, HttpBackend};
use crate::model::{CreatedId, Credentials, Deal, DealAlert, PriceAlert, SavedDeal, Session};

impl HttpBackend {
    /// `POST /login`
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        send_json(self.client().post(self.url("/login")).json(credentials)).await
    }

    /// `POST /register`
    pub async fn register(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        send_json(self.client().post(self.url("/register")).json(credentials)).await
    }

    // --- Saved deals ---

    pub async fn list_deals(&self) -> Result<Vec<SavedDeal>, ApiError> {
        let req = self.authed(self.client().get(self.url("/deals")))?;
        send_json(req).await
    }

    /// Bookmark a deal. The backend returns the existing id when the same
    /// city and dates are already saved.
    pub async fn save_deal(&self, deal: &Deal) -> Result<i64, ApiError> {
        let req = self.authed(self.client().post(self.url("/deals")).json(deal))?;
        let created: CreatedId = send_json(req).await?;
        Ok(created.id)
    }

    pub async fn delete_deal(&self, id: i64) -> Result<(), ApiError> {
        let req = self.authed(self.client().delete(self.url(&format!("/deals/{}", id))))?;
        send(req).await?;
        Ok(())
    }

    // --- Price alerts ---

    pub async fn list_alerts(&self) -> Result<Vec<PriceAlert>, ApiError> {
        let req = self.authed(self.client().get(self.url("/alerts")))?;
        send_json(req).await
    }

    pub async fn create_alert(
        &self,
        destination_city: &str,
        max_price: f64,
        telegram_chat_id: &str,
    ) -> Result<i64, ApiError> {
        let body = json!({
            "destination_city": destination_city,
            "max_price": max_price,
            "telegram_chat_id": telegram_chat_id,
        });
        let req = self.authed(self.client().post(self.url("/alerts")).json(&body))?;
        let created: CreatedId = send_json(req).await?;
        Ok(created.id)
    }

    pub async fn delete_alert(&self, id: i64) -> Result<(), ApiError> {
        let req = self.authed(self.client().delete(self.url(&format!("/alerts/{}", id))))?;
        send(req).await?;
        Ok(())
    }

    // --- Deal alerts ---

    pub async fn list_deal_alerts(&self) -> Result<Vec<DealAlert>, ApiError> {
        let req = self.authed(self.client().get(self.url("/deal-alerts")))?;
        send_json(req).await
    }

    pub async fn create_deal_alert(
        &self,
        airport: &str,
        max_price: f64,
        telegram_chat_id: &str,
    ) -> Result<i64, ApiError> {
        let body = json!({
            "airport": airport,
            "max_price": max_price,
            "telegram_chat_id": telegram_chat_id,
        });
        let req = self.authed(self.client().post(self.url("/deal-alerts")).json(&body))?;
        let created: CreatedId = send_json(req).await?;
        Ok(created.id)
    }

    pub async fn delete_deal_alert(&self, id: i64) -> Result<(), ApiError> {
        let req = self.authed(self.client().delete(self.url(&format!("/deal-alerts/{}", id))))?;
        send(req).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::serve;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        routing::{delete, get, post},
        Json, Router,
    };
    use serde_json::Value;
    use std::time::Duration;

    fn bearer_ok(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v == "Bearer secret-token")
    }

    fn router() -> Router {
        Router::new()
            .route(
                "/login",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({"username": body["username"], "token": "secret-token"}))
                }),
            )
            .route(
                "/deals",
                get(|headers: HeaderMap| async move {
                    if !bearer_ok(&headers) {
                        return Err(StatusCode::UNAUTHORIZED);
                    }
                    Ok(Json(json!([{
                        "id": 7,
                        "city": "Rom", "country": "Italien", "price": 45.0,
                        "departure_date": "2026-03-20", "return_date": "2026-03-22",
                        "origin": "Wien",
                        "saved_at": "2026-03-01 10:00:00"
                    }])))
                })
                .post(|headers: HeaderMap| async move {
                    if !bearer_ok(&headers) {
                        return Err(StatusCode::UNAUTHORIZED);
                    }
                    Ok(Json(json!({"id": 8})))
                }),
            )
            .route(
                "/deal-alerts",
                post(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"detail": "Maximal 2 Deal-Alerts erlaubt"})),
                    )
                }),
            )
            .route(
                "/alerts/{id}",
                delete(|Path(id): Path<i64>| async move {
                    if id == 3 {
                        StatusCode::OK
                    } else {
                        StatusCode::NOT_FOUND
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_login_then_authenticated_calls() {
        let base = serve(router()).await;
        let anonymous = HttpBackend::new(&base, Duration::from_secs(5)).unwrap();

        let session = anonymous
            .login(&Credentials { username: "anna".into(), password: "pw".into() })
            .await
            .unwrap();
        assert_eq!(session.username, "anna");

        let api = anonymous.clone().with_token(session.token);
        let deals = api.list_deals().await.unwrap();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].id, 7);
        assert_eq!(deals[0].deal.city, "Rom");

        let id = api.save_deal(&deals[0].deal).await.unwrap();
        assert_eq!(id, 8);

        api.delete_alert(3).await.unwrap();
        let err = api.delete_alert(4).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        // Nothing listens here; an attempted request would be a connectivity error.
        let api = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert_eq!(api.list_deals().await.unwrap_err(), ApiError::Unauthorized);
        assert_eq!(api.delete_deal(1).await.unwrap_err(), ApiError::Unauthorized);
    }

    #[tokio::test]
    async fn test_wrong_token_is_unauthorized() {
        let api = HttpBackend::new(&serve(router()).await, Duration::from_secs(5))
            .unwrap()
            .with_token("stale");
        assert_eq!(api.list_deals().await.unwrap_err(), ApiError::Unauthorized);
    }

    #[tokio::test]
    async fn test_deal_alert_limit_message() {
        let api = HttpBackend::new(&serve(router()).await, Duration::from_secs(5))
            .unwrap()
            .with_token("secret-token");
        let err = api.create_deal_alert("vie", 50.0, "12345").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status { status: 400, message: "Maximal 2 Deal-Alerts erlaubt".into() }
        );
    }
}
