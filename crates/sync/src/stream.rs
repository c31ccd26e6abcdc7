use crate::error::{ErrorKind, Result};
use crate::options::SyncOptions;
use crate::sync::{SyncReport, Synchronizer};
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};

/// Progress events emitted by [`sync_library`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    number of library novels.
/// 3. [`Synced`](Self::Synced): zero or more times, one per novel.
/// 4. [`Complete`](Self::Complete): exactly once, signalling the stream is
///    finished.
///
/// A discovery failure terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug)]
pub enum SyncEvent {
    Started,
    DiscoveryComplete(u64),
    Synced(SyncReport),
    Complete,
}

/// Streams [`SyncEvent`]s while syncing every novel in the library.
///
/// Novels flagged as in the library are synced concurrently, at most
/// `options.concurrency` at a time; more are started as running cycles
/// finish. A failed novel is yielded as an `Err` item raised as
/// [`ErrorKind::NovelFailed`] without terminating the stream. Only failing
/// to list the library is fatal.
pub fn sync_library<'a>(
    synchronizer: &'a Synchronizer,
    options: &'a SyncOptions,
) -> impl Stream<Item = Result<SyncEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(SyncEvent::Started);

        let novels = match synchronizer.repository().list_library_novels().await.or_raise(|| ErrorKind::Persistence) {
            Ok(novels) => novels,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield Ok(SyncEvent::DiscoveryComplete(u64::try_from(novels.len()).unwrap_or(0)));

        let mut pending = novels.into_iter().map(|novel| async move {
            let id = novel.id;
            synchronizer.sync(&novel, options).await.or_raise(|| ErrorKind::NovelFailed(id))
        });
        let mut running = FuturesUnordered::new();
        running.extend(pending.by_ref().take(options.concurrency.max(1)));
        while let Some(result) = running.next().await {
            yield result.map(SyncEvent::Synced);
            if let Some(next) = pending.next() {
                running.push(next);
            }
        }

        yield Ok(SyncEvent::Complete);
    })
}
