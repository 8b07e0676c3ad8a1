//! Keyed file store owned by one uploader.
//!
//! The store holds one ordered sequence per [`Bucket`]. The bucket set is
//! closed: typed access cannot name an unknown bucket, and the string
//! keyed variants (`get_named`, `set_named`, ...) reject unknown names
//! with [`StoreError::UnknownKey`].

use std::fmt;
use std::str::FromStr;

use crate::types::{FileDescriptor, FileId, UploadResult};

/// One named sequence in the [`FileStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Files that were already on the server when the widget started.
    ExistingFiles,
    /// Files currently shown in the widget (existing + captured).
    DisplayFiles,
    /// Captured files that have not been uploaded yet.
    NeedUploadFiles,
    /// Existing files the user removed from the widget.
    NeedDeleteFiles,
    /// Results of completed uploads.
    UploadedFiles,
    /// Files confirmed deleted on the server.
    DeletedFiles,
}

impl Bucket {
    /// Every bucket, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::ExistingFiles,
        Self::DisplayFiles,
        Self::NeedUploadFiles,
        Self::NeedDeleteFiles,
        Self::UploadedFiles,
        Self::DeletedFiles,
    ];

    /// The camelCase key used by string-keyed access.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ExistingFiles => "existingFiles",
            Self::DisplayFiles => "displayFiles",
            Self::NeedUploadFiles => "needUploadFiles",
            Self::NeedDeleteFiles => "needDeleteFiles",
            Self::UploadedFiles => "uploadedFiles",
            Self::DeletedFiles => "deletedFiles",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Bucket {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.key() == s)
            .ok_or_else(|| StoreError::UnknownKey(s.to_owned()))
    }
}

/// Errors from string-keyed store access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The name does not match any [`Bucket`].
    #[error("Invalid key: {0}")]
    UnknownKey(String),
}

/// One element of a bucket.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEntry {
    File(FileDescriptor),
    Uploaded(UploadResult),
}

impl StoreEntry {
    /// The file this entry refers to.
    #[must_use]
    pub const fn file(&self) -> &FileDescriptor {
        match self {
            Self::File(f) => f,
            Self::Uploaded(r) => &r.file,
        }
    }

    #[must_use]
    pub const fn as_upload_result(&self) -> Option<&UploadResult> {
        match self {
            Self::File(_) => None,
            Self::Uploaded(r) => Some(r),
        }
    }
}

impl From<FileDescriptor> for StoreEntry {
    fn from(file: FileDescriptor) -> Self {
        Self::File(file)
    }
}

impl From<UploadResult> for StoreEntry {
    fn from(result: UploadResult) -> Self {
        Self::Uploaded(result)
    }
}

/// Per-instance mapping from [`Bucket`] to an ordered entry list.
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    buckets: [Vec<StoreEntry>; Bucket::ALL.len()],
}

impl FileStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of `bucket`.
    #[must_use]
    pub fn get(&self, bucket: Bucket) -> &[StoreEntry] {
        &self.buckets[bucket.index()]
    }

    /// Replace the contents of `bucket`.
    pub fn set(&mut self, bucket: Bucket, entries: Vec<StoreEntry>) {
        self.buckets[bucket.index()] = entries;
    }

    /// Append `items` to `bucket`, preserving order. No deduplication.
    pub fn add_to<I>(&mut self, bucket: Bucket, items: I)
    where
        I: IntoIterator,
        I::Item: Into<StoreEntry>,
    {
        self.buckets[bucket.index()].extend(items.into_iter().map(Into::into));
    }

    /// Empty exactly `bucket`.
    pub fn reset(&mut self, bucket: Bucket) {
        self.buckets[bucket.index()].clear();
    }

    /// Empty every bucket.
    pub fn reset_all(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// The files referenced by `bucket`, in order.
    pub fn files(&self, bucket: Bucket) -> impl Iterator<Item = &FileDescriptor> {
        self.get(bucket).iter().map(StoreEntry::file)
    }

    /// Owned copy of the files referenced by `bucket`.
    #[must_use]
    pub fn cloned_files(&self, bucket: Bucket) -> Vec<FileDescriptor> {
        self.files(bucket).cloned().collect()
    }

    /// Whether `bucket` references the file with `id`.
    #[must_use]
    pub fn contains(&self, bucket: Bucket, id: FileId) -> bool {
        self.files(bucket).any(|f| f.id() == id)
    }

    /// Remove every entry in `bucket` that refers to `id`.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, bucket: Bucket, id: FileId) -> bool {
        let entries = &mut self.buckets[bucket.index()];
        let before = entries.len();
        entries.retain(|e| e.file().id() != id);
        entries.len() != before
    }

    #[must_use]
    pub fn len(&self, bucket: Bucket) -> usize {
        self.get(bucket).len()
    }

    #[must_use]
    pub fn is_empty(&self, bucket: Bucket) -> bool {
        self.get(bucket).is_empty()
    }

    /// [`get`](Self::get) by bucket name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownKey`] if `key` names no bucket.
    pub fn get_named(&self, key: &str) -> Result<&[StoreEntry], StoreError> {
        Ok(self.get(key.parse()?))
    }

    /// [`set`](Self::set) by bucket name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownKey`] if `key` names no bucket.
    pub fn set_named(&mut self, key: &str, entries: Vec<StoreEntry>) -> Result<(), StoreError> {
        self.set(key.parse()?, entries);
        Ok(())
    }

    /// [`add_to`](Self::add_to) by bucket name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownKey`] if `key` names no bucket.
    pub fn add_to_named<I>(&mut self, key: &str, items: I) -> Result<(), StoreError>
    where
        I: IntoIterator,
        I::Item: Into<StoreEntry>,
    {
        self.add_to(key.parse()?, items);
        Ok(())
    }

    /// [`reset`](Self::reset) by bucket name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownKey`] if `key` names no bucket.
    pub fn reset_named(&mut self, key: &str) -> Result<(), StoreError> {
        self.reset(key.parse()?);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn file(name: &str) -> FileDescriptor {
        FileDescriptor::new(name, "text/plain", vec![0u8; 3])
    }

    #[test]
    fn all_contains_every_variant_once() {
        let mut seen = std::collections::HashSet::new();
        for bucket in Bucket::ALL {
            assert!(seen.insert(bucket), "Duplicate bucket in ALL: {bucket}");
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn keys_round_trip_through_from_str() {
        for bucket in Bucket::ALL {
            assert_eq!(bucket.key().parse::<Bucket>().unwrap(), bucket);
        }
    }

    #[test]
    fn index_matches_position_in_all() {
        for (i, bucket) in Bucket::ALL.into_iter().enumerate() {
            assert_eq!(bucket.index(), i);
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = "favouriteFiles".parse::<Bucket>().unwrap_err();
        assert_eq!(err, StoreError::UnknownKey("favouriteFiles".into()));
        assert_eq!(err.to_string(), "Invalid key: favouriteFiles");
    }

    #[test]
    fn new_store_is_empty() {
        let store = FileStore::new();
        for bucket in Bucket::ALL {
            assert!(store.is_empty(bucket));
        }
    }

    #[test]
    fn add_to_appends_in_order_without_dedup() {
        let mut store = FileStore::new();
        let a = file("a");
        let b = file("b");
        store.add_to(Bucket::DisplayFiles, [a.clone()]);
        store.add_to(Bucket::DisplayFiles, [b.clone()]);
        store.add_to(Bucket::DisplayFiles, [a.clone()]);
        assert_eq!(store.cloned_files(Bucket::DisplayFiles), vec![a.clone(), b, a]);
    }

    #[test]
    fn set_replaces_contents() {
        let mut store = FileStore::new();
        store.add_to(Bucket::ExistingFiles, [file("old")]);
        let new = file("new");
        store.set(Bucket::ExistingFiles, vec![new.clone().into()]);
        assert_eq!(store.cloned_files(Bucket::ExistingFiles), vec![new]);
    }

    #[test]
    fn reset_empties_only_that_bucket() {
        let mut store = FileStore::new();
        let kept = file("kept");
        store.add_to(Bucket::DisplayFiles, [file("x")]);
        store.add_to(Bucket::NeedUploadFiles, [kept.clone()]);
        store.reset(Bucket::DisplayFiles);
        assert!(store.get(Bucket::DisplayFiles).is_empty());
        assert_eq!(store.cloned_files(Bucket::NeedUploadFiles), vec![kept]);
    }

    #[test]
    fn reset_all_empties_everything() {
        let mut store = FileStore::new();
        for bucket in Bucket::ALL {
            store.add_to(bucket, [file("f")]);
        }
        store.reset_all();
        for bucket in Bucket::ALL {
            assert!(store.is_empty(bucket), "{bucket} not empty");
        }
    }

    #[test]
    fn remove_filters_by_identity() {
        let mut store = FileStore::new();
        let a = file("same");
        let b = file("same");
        store.add_to(Bucket::DisplayFiles, [a.clone(), b.clone()]);
        assert!(store.remove(Bucket::DisplayFiles, a.id()));
        assert!(!store.remove(Bucket::DisplayFiles, a.id()));
        assert_eq!(store.cloned_files(Bucket::DisplayFiles), vec![b]);
    }

    #[test]
    fn uploaded_entries_expose_their_file() {
        let mut store = FileStore::new();
        let f = file("done");
        let result = UploadResult::success(f.clone(), serde_json::json!({"id": 7}));
        store.add_to(Bucket::UploadedFiles, [result.clone()]);
        assert!(store.contains(Bucket::UploadedFiles, f.id()));
        assert_eq!(
            store.get(Bucket::UploadedFiles)[0].as_upload_result(),
            Some(&result)
        );
    }

    #[test]
    fn named_access_matches_typed_access() {
        let mut store = FileStore::new();
        let a = file("a");
        store.add_to_named("needDeleteFiles", [a.clone()]).unwrap();
        assert_eq!(store.get_named("needDeleteFiles").unwrap().len(), 1);
        assert_eq!(store.cloned_files(Bucket::NeedDeleteFiles), vec![a]);
        store.reset_named("needDeleteFiles").unwrap();
        assert!(store.is_empty(Bucket::NeedDeleteFiles));
        store.set_named("deletedFiles", vec![file("d").into()]).unwrap();
        assert_eq!(store.len(Bucket::DeletedFiles), 1);
    }

    #[test]
    fn named_access_rejects_unknown_keys() {
        let mut store = FileStore::new();
        assert!(store.get_named("nope").is_err());
        assert!(store.set_named("nope", Vec::new()).is_err());
        assert!(store.add_to_named("nope", [file("a")]).is_err());
        assert!(store.reset_named("nope").is_err());
    }
}
