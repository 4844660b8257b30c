//! The evaluation primitive.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::context::SharedContext;
use crate::event::EvalEvent;

/// Receiving end of a session's event stream.
pub type Listener = UnboundedReceiver<EvalEvent>;

/// Sending end of a session's event stream.
pub type EventSink = UnboundedSender<EvalEvent>;

/// Something that evaluates units of code against a shared context.
///
/// `eval` only hands the unit over. What happens to it (values, thrown
/// errors, errors thrown later by callbacks the unit scheduled) is reported on
/// the listener that was created alongside the evaluator. Implementations may
/// be invoked any number of times against the same context.
#[allow(async_fn_in_trait)]
pub trait Evaluator {
    /// Submit `code` under the source name `unit`.
    async fn eval(&mut self, code: &str, context: &SharedContext, unit: &str) -> crate::Result<()>;
}
