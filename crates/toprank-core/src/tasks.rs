use tokio::task::JoinSet;

use crate::PipelineError;

/// Waits for every indexed task and returns their outputs in index order.
///
/// The first failure aborts the tasks still running and is returned as is.
pub(crate) async fn join_ordered<T, E>(
    mut tasks: JoinSet<(usize, Result<T, E>)>,
    len: usize,
) -> Result<Vec<T>, PipelineError>
where
    T: Send + 'static,
    E: Into<PipelineError> + Send + 'static,
{
    let mut slots: Vec<Option<T>> = (0..len).map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = match joined {
            Ok(output) => output,
            Err(error) => {
                tasks.abort_all();
                return Err(PipelineError::TaskFailed(error.to_string()));
            }
        };

        match result {
            Ok(value) => {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(value);
                }
            }
            Err(error) => {
                tasks.abort_all();
                return Err(error.into());
            }
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| PipelineError::TaskFailed(format!("task {index} produced no result")))
        })
        .collect()
}
