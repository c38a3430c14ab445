use crate::engine::pipeline::ContentPipeline;
use crate::notifier::SubscriberRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub(crate) pipeline: Arc<ContentPipeline>,
    pub(crate) notifier: Arc<SubscriberRegistry>,
}

impl ApiState {
    pub fn new(pipeline: Arc<ContentPipeline>, notifier: Arc<SubscriberRegistry>) -> Self {
        Self { pipeline, notifier }
    }
}
