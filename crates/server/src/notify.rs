//! Outbound webhook alerts for new submissions.
//!
//! Delivery is best effort: a failed alert is logged and never fails the
//! submission that triggered it.

use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use shared_types::{NotificationConfig, Record, RecordBody};

use crate::storage::RecordStore;

const FOOTER: &str = "Wee Class 알림 시스템";
const FIELD_LIMIT: usize = 200;
const EMPTY_VALUE: &str = "내용 없음";

const STUDENT_COLOR: u32 = 3_447_003;
const PARENT_COLOR: u32 = 15_844_367;
const TEACHER_COLOR: u32 = 9_327_824;
const TEST_COLOR: u32 = 5_763_719;

/// Shared HTTP client for webhook delivery.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Alert the configured webhook about `record`. Silently does nothing when
    /// notifications are off or unconfigured.
    #[tracing::instrument(skip_all, fields(record_id = %record.id, role = %record.role()))]
    pub async fn dispatch(&self, store: &RecordStore, record: &Record) {
        let config = match store.notification_config().await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read notification settings");
                return;
            }
        };

        if !config.is_active() {
            tracing::debug!("Notifications disabled; skipping webhook");
            return;
        }

        if let Err(e) = self.post(&config.webhook_url, &build_payload(record)).await {
            tracing::warn!(error = %e, "Failed to deliver submission alert");
        }
    }

    /// Send a fixed test message to `config`'s webhook, reporting the failure.
    /// Works whether or not the config is enabled.
    pub async fn send_test(&self, config: &NotificationConfig) -> Result<(), String> {
        if config.webhook_url.trim().is_empty() {
            return Err("웹훅 URL을 입력해주세요.".to_string());
        }
        self.post(&config.webhook_url, &test_payload()).await
    }

    async fn post(&self, url: &str, payload: &Value) -> Result<(), String> {
        let response = self
            .client
            .post(url.trim())
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("Webhook request failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Webhook error ({status}): {body}"));
        }

        tracing::info!("Webhook delivered");
        Ok(())
    }
}

/// Cut `text` to `FIELD_LIMIT` characters, appending `...` when shortened.
/// Blank values render as a placeholder.
fn truncate(text: &str) -> String {
    if text.trim().is_empty() {
        return EMPTY_VALUE.to_string();
    }
    if text.chars().count() > FIELD_LIMIT {
        let cut: String = text.chars().take(FIELD_LIMIT).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

fn describe(lines: &[(&str, &str)]) -> String {
    lines
        .iter()
        .map(|(label, value)| format!("**{label}:** {}", truncate(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn embed(title: &str, description: String, color: u32) -> Value {
    json!({
        "embeds": [{
            "title": title,
            "description": description,
            "color": color,
            "timestamp": Utc::now().to_rfc3339(),
            "footer": { "text": FOOTER },
        }]
    })
}

/// Discord-compatible embed describing a new submission.
pub fn build_payload(record: &Record) -> Value {
    match &record.body {
        RecordBody::Student(form) => embed(
            "😊 학생 상담 신청이 도착했습니다!",
            describe(&[
                ("이름", form.name.as_str()),
                ("학년/반", form.grade_class.as_str()),
                ("신청 사유", form.reason.as_str()),
            ]),
            STUDENT_COLOR,
        ),
        RecordBody::Parent(form) => embed(
            "🏠 학부모 상담 신청이 도착했습니다!",
            describe(&[
                ("자녀 이름", form.child_name.as_str()),
                ("신청자", form.relation.as_ref().map(|r| r.label()).unwrap_or_default()),
                ("연락처", form.contact.as_str()),
                ("걱정되는 점", form.worries.as_str()),
            ]),
            PARENT_COLOR,
        ),
        RecordBody::Teacher(form) => embed(
            "🏫 교사 상담 의뢰가 도착했습니다!",
            describe(&[
                ("학생 이름", form.student_name.as_str()),
                ("학년/반", form.grade_class.as_str()),
                ("의뢰 사유", form.referral_reason.as_str()),
            ]),
            TEACHER_COLOR,
        ),
    }
}

fn test_payload() -> Value {
    embed(
        "🔔 테스트 알림",
        "알림 설정이 정상적으로 연결되었습니다.".to_string(),
        TEST_COLOR,
    )
}
