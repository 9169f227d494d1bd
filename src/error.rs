/// Extension for results whose failure is tolerable but worth surfacing.
///
/// Used on the best-effort paths (e.g., walking descendant cgroups), where
/// a single unreadable entry must not fail the whole operation.
pub trait ResultOkLogExt<T, E> {
    /// Converts the result into an [`Option`], logging the error case.
    fn ok_log(self) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }
}
