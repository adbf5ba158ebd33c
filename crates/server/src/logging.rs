use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::FmtSubscriber;

/// Installs the process-wide `fmt` subscriber.
///
/// Fails if a global subscriber was already set.
pub fn init(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)
}
