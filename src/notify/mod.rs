//! Notification dispatch contract. Real delivery belongs to an external
//! email service; the portal only depends on this trait. The in-tree
//! implementation is the dev-mode mailer, which logs instead of
//! sending, the same split the upstream email service draws between
//! its SMTP and console modes.

use rand::Rng;
use serde::Serialize;

use crate::errors::AppError;

/// Receipt returned by the dispatcher.
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub delivered: bool,
    pub message_id: Option<String>,
}

/// A collaboration invitation email, fully resolved by the caller.
/// Email shape validation happens before this struct is built; the
/// dispatcher never sees a malformed address.
#[derive(Debug)]
pub struct InviteEmail<'a> {
    pub to_email: &'a str,
    pub proposal_title: &'a str,
    pub proposal_id: i64,
    pub inviter_name: &'a str,
    pub role: &'a str,
    pub message: &'a str,
}

pub trait Dispatcher: Send + Sync {
    /// Notify a proposal's author that a reviewer left feedback.
    fn send_feedback(
        &self,
        author_email: &str,
        proposal_id: i64,
        proposal_title: &str,
        feedback: &str,
    ) -> Result<Delivery, AppError>;

    /// Send a collaboration invitation.
    fn send_invite(&self, invite: &InviteEmail<'_>) -> Result<Delivery, AppError>;
}

/// Dev-mode dispatcher: writes the mail to the log and reports it
/// delivered.
pub struct LogMailer;

fn message_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 8] = rng.random();
    format!("dev-{}", hex::encode(bytes))
}

impl Dispatcher for LogMailer {
    fn send_feedback(
        &self,
        author_email: &str,
        proposal_id: i64,
        proposal_title: &str,
        feedback: &str,
    ) -> Result<Delivery, AppError> {
        log::info!(
            "[mail] feedback on proposal #{proposal_id} '{proposal_title}' \
             to {author_email}: {feedback}"
        );
        Ok(Delivery { delivered: true, message_id: Some(message_id()) })
    }

    fn send_invite(&self, invite: &InviteEmail<'_>) -> Result<Delivery, AppError> {
        log::info!(
            "[mail] collaboration invite to {} for proposal #{} '{}' \
             from {} (role: {})",
            invite.to_email,
            invite.proposal_id,
            invite.proposal_title,
            invite.inviter_name,
            invite.role,
        );
        Ok(Delivery { delivered: true, message_id: Some(message_id()) })
    }
}
