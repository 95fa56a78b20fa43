//! Hands stored codes to their delivery channel

use std::sync::Arc;

use dragon_shared::utils::phone::mask_phone_number;

use crate::domain::entities::VerificationCode;
use crate::domain::value_objects::ChallengeKind;
use crate::errors::VerificationError;

use super::traits::{ImageRenderer, SmsSender};
use super::types::{Delivery, RenderedImage};

/// Routes a code to the SMS sender or the image renderer
pub struct CodeDispatcher<S: SmsSender + ?Sized, R: ImageRenderer + ?Sized> {
    sms_sender: Arc<S>,
    image_renderer: Arc<R>,
}

impl<S: SmsSender + ?Sized, R: ImageRenderer + ?Sized> CodeDispatcher<S, R> {
    pub fn new(sms_sender: Arc<S>, image_renderer: Arc<R>) -> Self {
        Self {
            sms_sender,
            image_renderer,
        }
    }

    /// Deliver a code through the channel of its kind
    pub async fn deliver(&self, code: &VerificationCode) -> Result<Delivery, VerificationError> {
        match code.kind {
            ChallengeKind::Sms => {
                let message_id = self.deliver_sms(code.key.as_str(), code).await?;
                Ok(Delivery::Sms { message_id })
            }
            ChallengeKind::Image => Ok(Delivery::Image(self.render_image(code)?)),
        }
    }

    /// Send an SMS code, returning the provider message id
    pub async fn deliver_sms(&self, recipient: &str, code: &VerificationCode) -> Result<String, VerificationError> {
        self.sms_sender.send(recipient, code).await.map_err(|reason| {
            VerificationError::DeliveryFailed {
                key: mask_phone_number(recipient),
                reason,
            }
        })
    }

    /// Render an image code
    pub fn render_image(&self, code: &VerificationCode) -> Result<RenderedImage, VerificationError> {
        self.image_renderer
            .render(&code.value)
            .map_err(|reason| VerificationError::DeliveryFailed {
                key: code.key.to_string(),
                reason,
            })
    }
}
