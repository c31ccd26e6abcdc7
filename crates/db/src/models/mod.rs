mod change;
mod chapter;
mod novel;

pub use self::change::{AppliedChanges, Change, ChangeSet, ChapterDiff, InsertedChapter};
pub use self::chapter::{Chapter, ChapterOrder};
pub(crate) use self::chapter::ChapterRow;
pub use self::novel::{DEFAULT_AUTHOR, Novel, NovelMetadata};
pub(crate) use self::novel::NovelRow;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use time::UtcDateTime;

pub(crate) fn timestamp_from_row(value: i64, what: &'static str) -> Result<UtcDateTime> {
    UtcDateTime::from_unix_timestamp(value).or_raise(|| ErrorKind::InvalidData(what))
}
