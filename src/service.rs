use broker::Runtime;
use log::info;

use crate::{PredictionRequestHandler, ServiceConfig};

/// Registers `handler` with `runtime`, consuming the configured input topic and
/// publishing every result on the configured output topic.
///
/// # Arguments
/// * `runtime` - The messaging runtime dispatching the requests.
/// * `config` - Names the topics and the allowed concurrency.
/// * `handler` - The handler answering the requests.
pub fn register(runtime: &Runtime, config: &ServiceConfig, handler: PredictionRequestHandler) {
    runtime.register(
        &config.input_topic,
        &config.output_topic,
        config.concurrency,
        move |payload| handler.handle(payload),
    );

    info!(
        input = config.input_topic.as_str(),
        output = config.output_topic.as_str();
        "prediction handler registered"
    );
}
