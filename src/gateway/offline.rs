use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tracing::debug;

use super::{
    AnalysisGateway, AudioHandle, GatewayError, NagRequest, NagScript, PurchaseAnalysis,
    PurchaseContext, RawReceipt,
};
use crate::core::time::Clock;
use crate::domain::{AiTone, Category};

const DEFAULT_RETURN_WINDOW_DAYS: i64 = 30;
const JUSTIFIED_TREAT_LIMIT: f64 = 50.0;

/// Rule-based gateway that works without network access.
///
/// Essentials (groceries, health, transport) are approved, small justified
/// purchases are approved, everything else is judged unnecessary. Speech
/// synthesis is not available, so calls are text-only.
pub struct OfflineGateway {
    clock: Arc<dyn Clock>,
}

impl OfflineGateway {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn is_necessary(context: &PurchaseContext) -> bool {
        let essential = matches!(
            context.category,
            Category::Groceries | Category::Health | Category::Transport
        );
        let justified_treat = context.amount < JUSTIFIED_TREAT_LIMIT
            && context
                .justification
                .as_deref()
                .map(|text| !text.trim().is_empty())
                .unwrap_or(false);
        essential || justified_treat
    }

    fn call_script(context: &PurchaseContext) -> String {
        let goal = context
            .profile
            .as_ref()
            .map(|profile| format!(" That money belongs to {}.", profile.goal_name))
            .unwrap_or_default();
        match context.tone {
            AiTone::Encouraging => format!(
                "Hey, it's your wallet calling. {} for {:.2} is a lot. You can still take it back and feel great about it.{}",
                context.item, context.amount, goal
            ),
            AiTone::Stern => format!(
                "This is your budget. {} at {:.2} was not in the plan. Return it.{}",
                context.item, context.amount, goal
            ),
            AiTone::Ruthless => format!(
                "{:.2} on {}? Really? Box it up and march it back to the store today.{}",
                context.amount, context.item, goal
            ),
        }
    }

    fn hot_take(context: &PurchaseContext, necessary: bool) -> String {
        if necessary {
            format!("{} sounds reasonable. Sleep on it anyway.", context.item)
        } else {
            format!(
                "Wanting {} is fine. Buying it for {:.2} is the problem.",
                context.item, context.amount
            )
        }
    }
}

#[async_trait]
impl AnalysisGateway for OfflineGateway {
    async fn analyze_purchase(
        &self,
        context: &PurchaseContext,
    ) -> Result<PurchaseAnalysis, GatewayError> {
        let is_necessary = Self::is_necessary(context);
        debug!(item = %context.item, is_necessary, "offline analysis");
        let reasoning = if is_necessary {
            format!("{} covers an essential need.", context.category)
        } else {
            format!(
                "{} is a want, not a need, and {:.2} adds up fast.",
                context.category, context.amount
            )
        };
        let estimated_return_by = if context.is_returnable && context.return_by.is_none() {
            Some(self.clock.today() + Duration::days(DEFAULT_RETURN_WINDOW_DAYS))
        } else {
            None
        };
        Ok(PurchaseAnalysis {
            is_necessary,
            reasoning,
            call_script: Self::call_script(context),
            hot_take: context
                .is_urge
                .then(|| Self::hot_take(context, is_necessary)),
            estimated_return_by,
        })
    }

    async fn generate_call_audio(&self, _script: &str) -> Result<AudioHandle, GatewayError> {
        Err(GatewayError::AudioGenerationFailure(
            "speech synthesis is unavailable offline".into(),
        ))
    }

    async fn generate_nag_script(&self, request: &NagRequest) -> Result<NagScript, GatewayError> {
        let script = match request.tone {
            AiTone::Encouraging => format!(
                "Just checking in about the {}. Returning it puts {:.2} back in your pocket.",
                request.item, request.amount
            ),
            AiTone::Stern => format!(
                "Reminder number {}: the {} is still returnable. Handle it.",
                request.nag_count, request.item
            ),
            AiTone::Ruthless => format!(
                "Call {} about the {}. I will keep calling. Return it.",
                request.nag_count, request.item
            ),
        };
        Ok(NagScript { script })
    }

    /// Accepts plain-text receipts in the form `item;amount;category`.
    async fn analyze_receipt(&self, image: &[u8]) -> Result<RawReceipt, GatewayError> {
        let text = std::str::from_utf8(image).map_err(|_| {
            GatewayError::ReceiptParseFailure("offline scanner only reads text receipts".into())
        })?;
        let mut parts = text.trim().splitn(3, ';');
        let item = parts.next().unwrap_or_default().trim().to_string();
        let amount = parts
            .next()
            .and_then(|raw| raw.trim().trim_start_matches('$').parse::<f64>().ok())
            .ok_or_else(|| GatewayError::ReceiptParseFailure("missing receipt total".into()))?;
        let category = parts.next().unwrap_or_default().trim().to_string();
        Ok(RawReceipt {
            item,
            amount,
            category,
        })
    }

    async fn financial_tip(&self, category: Category) -> Result<String, GatewayError> {
        let tip = match category {
            Category::FastFood | Category::Dining => {
                "Batch-cook twice a week; takeout cravings drop when dinner is already waiting."
            }
            Category::Groceries => "Shop with a list and never on an empty stomach.",
            Category::Electronics => "Wait 30 days before any gadget purchase over 100.",
            Category::Clothing => "One in, one out: buy a piece only when retiring another.",
            Category::Entertainment | Category::Subscriptions => {
                "Audit subscriptions monthly and cancel anything unused for two weeks."
            }
            Category::Travel => "Book flexible fares early and set a daily spending cap.",
            Category::Health => "Generic brands work just as well for most medicine.",
            Category::Home => "Borrow tools before buying them.",
            Category::Transport => "Bundle errands into one trip.",
            Category::Other => "Pay yourself first: move savings out on payday.",
        };
        Ok(tip.to_string())
    }
}
