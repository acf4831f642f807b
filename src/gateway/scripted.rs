use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{
    AnalysisGateway, AudioHandle, GatewayError, NagRequest, NagScript, PurchaseAnalysis,
    PurchaseContext, RawReceipt,
};
use crate::domain::Category;

/// Gateway double with canned answers and per-operation call counters.
pub struct ScriptedGateway {
    analysis: Mutex<Option<PurchaseAnalysis>>,
    nag_script: Mutex<Option<String>>,
    receipt: Mutex<Option<RawReceipt>>,
    analysis_delay: Mutex<Option<Duration>>,
    nag_delay: Mutex<Option<Duration>>,
    audio_available: AtomicBool,
    analyze_calls: AtomicUsize,
    audio_calls: AtomicUsize,
    nag_calls: AtomicUsize,
    receipt_calls: AtomicUsize,
    contexts: Mutex<Vec<PurchaseContext>>,
}

impl ScriptedGateway {
    fn with_analysis(analysis: Option<PurchaseAnalysis>) -> Self {
        Self {
            analysis: Mutex::new(analysis),
            nag_script: Mutex::new(Some("Still thinking about it? Return it.".into())),
            receipt: Mutex::new(None),
            analysis_delay: Mutex::new(None),
            nag_delay: Mutex::new(None),
            audio_available: AtomicBool::new(true),
            analyze_calls: AtomicUsize::new(0),
            audio_calls: AtomicUsize::new(0),
            nag_calls: AtomicUsize::new(0),
            receipt_calls: AtomicUsize::new(0),
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// Every purchase is judged necessary.
    pub fn necessary() -> Self {
        Self::with_analysis(Some(PurchaseAnalysis {
            is_necessary: true,
            reasoning: "Looks like a need.".into(),
            call_script: String::new(),
            hot_take: Some("Fair enough.".into()),
            estimated_return_by: None,
        }))
    }

    /// Every purchase is judged unnecessary and the given script is returned.
    pub fn unnecessary(script: impl Into<String>) -> Self {
        Self::with_analysis(Some(PurchaseAnalysis {
            is_necessary: false,
            reasoning: "This is a want.".into(),
            call_script: script.into(),
            hot_take: Some("Put it back.".into()),
            estimated_return_by: None,
        }))
    }

    /// Every analysis request fails.
    pub fn failing() -> Self {
        Self::with_analysis(None)
    }

    pub fn set_analysis(&self, analysis: Option<PurchaseAnalysis>) {
        *lock(&self.analysis) = analysis;
    }

    pub fn set_nag_script(&self, script: Option<String>) {
        *lock(&self.nag_script) = script;
    }

    pub fn set_receipt(&self, receipt: Option<RawReceipt>) {
        *lock(&self.receipt) = receipt;
    }

    /// Makes every purchase analysis wait before answering.
    pub fn set_analysis_delay(&self, delay: Option<Duration>) {
        *lock(&self.analysis_delay) = delay;
    }

    /// Makes every nag script request wait before answering.
    pub fn set_nag_delay(&self, delay: Option<Duration>) {
        *lock(&self.nag_delay) = delay;
    }

    pub fn set_audio_available(&self, available: bool) {
        self.audio_available.store(available, Ordering::SeqCst);
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn audio_calls(&self) -> usize {
        self.audio_calls.load(Ordering::SeqCst)
    }

    pub fn nag_calls(&self) -> usize {
        self.nag_calls.load(Ordering::SeqCst)
    }

    pub fn receipt_calls(&self) -> usize {
        self.receipt_calls.load(Ordering::SeqCst)
    }

    /// Contexts passed to `analyze_purchase`, oldest first.
    pub fn contexts(&self) -> Vec<PurchaseContext> {
        lock(&self.contexts).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl AnalysisGateway for ScriptedGateway {
    async fn analyze_purchase(
        &self,
        context: &PurchaseContext,
    ) -> Result<PurchaseAnalysis, GatewayError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.contexts).push(context.clone());
        let delay = *lock(&self.analysis_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut analysis = lock(&self.analysis)
            .clone()
            .ok_or_else(|| GatewayError::AnalysisFailure("scripted failure".into()))?;
        if !context.is_urge {
            analysis.hot_take = None;
        }
        Ok(analysis)
    }

    async fn generate_call_audio(&self, script: &str) -> Result<AudioHandle, GatewayError> {
        let call = self.audio_calls.fetch_add(1, Ordering::SeqCst);
        if self.audio_available.load(Ordering::SeqCst) {
            Ok(AudioHandle(format!("memory://call-{call}?chars={}", script.len())))
        } else {
            Err(GatewayError::AudioGenerationFailure(
                "scripted audio failure".into(),
            ))
        }
    }

    async fn generate_nag_script(&self, _request: &NagRequest) -> Result<NagScript, GatewayError> {
        self.nag_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *lock(&self.nag_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.nag_script)
            .clone()
            .map(|script| NagScript { script })
            .ok_or_else(|| GatewayError::AudioGenerationFailure("scripted nag failure".into()))
    }

    async fn analyze_receipt(&self, _image: &[u8]) -> Result<RawReceipt, GatewayError> {
        self.receipt_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.receipt)
            .clone()
            .ok_or_else(|| GatewayError::ReceiptParseFailure("scripted receipt failure".into()))
    }

    async fn financial_tip(&self, category: Category) -> Result<String, GatewayError> {
        Ok(format!("Spend less on {category}."))
    }
}
