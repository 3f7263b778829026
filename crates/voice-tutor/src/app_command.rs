/// Commands sent from the terminal input reader to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a voice session, or stop the running one.
    ToggleSession,
    /// Request application shutdown.
    Shutdown,
}
