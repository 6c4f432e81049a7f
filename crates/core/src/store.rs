//! File-backed record store.
//!
//! Every record lives in its own sharded directory as a single YAML file:
//!
//! ```text
//! <data_dir>/
//! ├── documenten/<s1>/<s2>/<uuid>/informatieobject.yaml   (+ files/ with content)
//! ├── verzendingen/<s1>/<s2>/<uuid>/verzending.yaml
//! └── objectinformatieobjecten/<s1>/<s2>/<uuid>/objectinformatieobject.yaml
//! ```
//!
//! where `s1`/`s2` are the first four hex characters of the UUID.
//!
//! Writes go through a [`Transaction`], which holds the store-wide async mutex for its lifetime.
//! Callers validate everything first and only then write, so a rejected request never leaves
//! partial state behind. Reads do not take the mutex; record files are replaced by rename and
//! are never observed half-written.

use crate::config::CoreConfig;
use crate::constants::{
    IDENTIFICATIE_PREFIX, INFORMATIEOBJECT_YAML_FILENAME, RELATION_YAML_FILENAME,
    REMOVAL_DIR_NAME, VERZENDING_YAML_FILENAME,
};
use crate::model::{InformatieObjectRecord, ObjectInformatieObject, Verzending};
use crate::{DrcError, DrcResult};
use drc_files::{FileMetadata, FilesService};
use drc_types::Rsin;
use drc_uuid::ShardableUuid;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// A record type persisted by the [`Store`].
pub trait Record: Serialize + DeserializeOwned {
    /// Human readable kind, used in not-found errors.
    const KIND: &'static str;
    const FILENAME: &'static str;

    fn collection_dir(cfg: &CoreConfig) -> PathBuf;
    fn record_uuid(&self) -> &ShardableUuid;
}

impl Record for InformatieObjectRecord {
    const KIND: &'static str = "informatieobject";
    const FILENAME: &'static str = INFORMATIEOBJECT_YAML_FILENAME;

    fn collection_dir(cfg: &CoreConfig) -> PathBuf {
        cfg.documenten_dir()
    }

    fn record_uuid(&self) -> &ShardableUuid {
        &self.uuid
    }
}

impl Record for Verzending {
    const KIND: &'static str = "verzending";
    const FILENAME: &'static str = VERZENDING_YAML_FILENAME;

    fn collection_dir(cfg: &CoreConfig) -> PathBuf {
        cfg.verzendingen_dir()
    }

    fn record_uuid(&self) -> &ShardableUuid {
        &self.uuid
    }
}

impl Record for ObjectInformatieObject {
    const KIND: &'static str = "objectinformatieobject";
    const FILENAME: &'static str = RELATION_YAML_FILENAME;

    fn collection_dir(cfg: &CoreConfig) -> PathBuf {
        cfg.relations_dir()
    }

    fn record_uuid(&self) -> &ShardableUuid {
        &self.uuid
    }
}

#[derive(Debug)]
pub struct Store {
    cfg: Arc<CoreConfig>,
    write_lock: Mutex<()>,
}

impl Store {
    /// Opens the store under `cfg.data_dir()`, creating the collection directories.
    ///
    /// # Errors
    ///
    /// Returns `DrcError::StorageDirCreation` if a collection directory cannot be created.
    pub fn new(cfg: Arc<CoreConfig>) -> DrcResult<Self> {
        for dir in [
            cfg.documenten_dir(),
            cfg.verzendingen_dir(),
            cfg.relations_dir(),
        ] {
            fs::create_dir_all(&dir).map_err(DrcError::StorageDirCreation)?;
        }

        Ok(Self {
            cfg,
            write_lock: Mutex::new(()),
        })
    }

    pub fn cfg(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn config(&self) -> Arc<CoreConfig> {
        self.cfg.clone()
    }

    /// Starts a write transaction, waiting for any other writer to finish.
    pub async fn transaction(&self) -> Transaction<'_> {
        let guard = self.write_lock.lock().await;
        Transaction {
            store: self,
            _guard: guard,
        }
    }

    fn record_dir<R: Record>(&self, uuid: &ShardableUuid) -> PathBuf {
        uuid.sharded_dir(&R::collection_dir(&self.cfg))
    }

    /// Loads one record; `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `DrcError::FileRead` or `DrcError::YamlDeserialization` if the record exists but
    /// cannot be read.
    pub fn load<R: Record>(&self, uuid: &ShardableUuid) -> DrcResult<Option<R>> {
        let path = self.record_dir::<R>(uuid).join(R::FILENAME);
        if !path.is_file() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path).map_err(DrcError::FileRead)?;
        serde_yaml::from_str(&contents)
            .map(Some)
            .map_err(DrcError::YamlDeserialization)
    }

    /// Loads one record or fails with `DrcError::NotFound`.
    pub fn get<R: Record>(&self, uuid: &ShardableUuid) -> DrcResult<R> {
        self.load(uuid)?
            .ok_or_else(|| DrcError::not_found(R::KIND, uuid.to_string()))
    }

    /// Lists every record of a kind, ordered by UUID.
    ///
    /// Record files that cannot be parsed are logged as warnings and skipped.
    pub fn list<R: Record>(&self) -> Vec<R> {
        self.walk(false).unwrap_or_default()
    }

    /// Like [`Store::list`], but fails on the first record file that cannot be read.
    ///
    /// # Errors
    ///
    /// Returns `DrcError::FileRead` or `DrcError::YamlDeserialization` for a broken record.
    pub fn list_strict<R: Record>(&self) -> DrcResult<Vec<R>> {
        self.walk(true)
    }

    fn walk<R: Record>(&self, strict: bool) -> DrcResult<Vec<R>> {
        let mut records = Vec::new();

        let collection_dir = R::collection_dir(&self.cfg);
        let s1_iter = match fs::read_dir(&collection_dir) {
            Ok(it) => it,
            Err(_) => return Ok(records),
        };
        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(&s1_path) {
                Ok(it) => it,
                Err(_) => continue,
            };
            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(&s2_path) {
                    Ok(it) => it,
                    Err(_) => continue,
                };
                for id_ent in id_iter.flatten() {
                    let record_path = id_ent.path().join(R::FILENAME);
                    if !record_path.is_file() {
                        continue;
                    }

                    match read_record::<R>(&record_path) {
                        Ok(record) => records.push(record),
                        Err(e) if strict => return Err(e),
                        Err(e) => tracing::warn!(
                            "failed to parse {}: {} - {}",
                            R::FILENAME,
                            record_path.display(),
                            e
                        ),
                    }
                }
            }
        }

        records.sort_by_key(|r| r.record_uuid().to_string());
        Ok(records)
    }

    /// Reads stored content of a document family.
    ///
    /// # Errors
    ///
    /// Returns `DrcError::Files` if the family directory or the file is missing.
    pub fn read_content(&self, family: &ShardableUuid, meta: &FileMetadata) -> DrcResult<Vec<u8>> {
        let files = FilesService::new(&self.cfg.documenten_dir(), family.clone())?;
        Ok(files.read(meta.hash.as_str())?)
    }

    /// Relations that point at a document family.
    ///
    /// Unreadable relation files are errors here, since a missed relation would let a guarded
    /// delete through.
    pub fn relations_for(&self, family: &ShardableUuid) -> DrcResult<Vec<ObjectInformatieObject>> {
        Ok(self
            .list_strict::<ObjectInformatieObject>()?
            .into_iter()
            .filter(|r| &r.informatieobject == family)
            .collect())
    }

    /// Verzendingen that refer to a document family.
    pub fn verzendingen_for(&self, family: &ShardableUuid) -> DrcResult<Vec<Verzending>> {
        Ok(self
            .list_strict::<Verzending>()?
            .into_iter()
            .filter(|v| &v.informatieobject == family)
            .collect())
    }

    /// True if another family already uses `identificatie` for `bronorganisatie`.
    pub fn identificatie_in_use(
        &self,
        bronorganisatie: &Rsin,
        identificatie: &str,
        except: Option<&ShardableUuid>,
    ) -> bool {
        self.list::<InformatieObjectRecord>()
            .iter()
            .filter(|record| Some(&record.uuid) != except)
            .flat_map(|record| record.versions())
            .any(|v| &v.bronorganisatie == bronorganisatie && v.identificatie == identificatie)
    }

    /// Next generated identification, `DOCUMENT-<year>-<sequence>`, for an organisation.
    pub fn next_identificatie(&self, bronorganisatie: &Rsin, year: i32) -> String {
        let prefix = format!("{IDENTIFICATIE_PREFIX}-{year}-");
        let highest = self
            .list::<InformatieObjectRecord>()
            .iter()
            .flat_map(|record| record.versions())
            .filter(|v| &v.bronorganisatie == bronorganisatie)
            .filter_map(|v| v.identificatie.strip_prefix(&prefix)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        format!("{prefix}{:010}", highest + 1)
    }
}

fn read_record<R: Record>(path: &Path) -> DrcResult<R> {
    let contents = fs::read_to_string(path).map_err(DrcError::FileRead)?;
    serde_yaml::from_str(&contents).map_err(DrcError::YamlDeserialization)
}

/// Exclusive write access to the [`Store`]. Dereferences to the store for reads.
pub struct Transaction<'a> {
    store: &'a Store,
    _guard: MutexGuard<'a, ()>,
}

impl Deref for Transaction<'_> {
    type Target = Store;

    fn deref(&self) -> &Store {
        self.store
    }
}

impl Transaction<'_> {
    /// Writes a new record, creating its directory.
    ///
    /// # Errors
    ///
    /// If writing fails the new directory is removed again; if that also fails,
    /// `DrcError::CleanupAfterCreateFailed` carries both errors.
    pub fn insert<R: Record>(&self, record: &R) -> DrcResult<()> {
        self.create_with::<R>(record.record_uuid(), |_| self.save(record))
    }

    /// Writes a new document family, storing `content` (decoded bytes and filename) first.
    ///
    /// The latest version of `record` is updated to reference the stored content.
    pub fn insert_informatieobject(
        &self,
        record: &mut InformatieObjectRecord,
        content: Option<(&[u8], Option<&str>)>,
    ) -> DrcResult<()> {
        let uuid = record.uuid.clone();
        self.create_with::<InformatieObjectRecord>(&uuid, |_| {
            if let Some((bytes, filename)) = content {
                let meta = self.store_content(&uuid, bytes, filename)?;
                record.latest_mut().content = Some(meta);
            }
            self.save(&*record)
        })
    }

    fn create_with<R: Record>(
        &self,
        uuid: &ShardableUuid,
        write: impl FnOnce(&Path) -> DrcResult<()>,
    ) -> DrcResult<()> {
        let record_dir = self.record_dir::<R>(uuid);
        fs::create_dir_all(&record_dir).map_err(DrcError::StorageDirCreation)?;

        match write(&record_dir) {
            Ok(()) => Ok(()),
            Err(create_error) => match fs::remove_dir_all(&record_dir) {
                Ok(()) => Err(create_error),
                Err(cleanup_error) => Err(DrcError::CleanupAfterCreateFailed {
                    path: record_dir,
                    create_error: Box::new(create_error),
                    cleanup_error,
                }),
            },
        }
    }

    /// Replaces the YAML file of an existing record.
    pub fn save<R: Record>(&self, record: &R) -> DrcResult<()> {
        let record_dir = self.record_dir::<R>(record.record_uuid());
        let path = record_dir.join(R::FILENAME);
        let yaml = serde_yaml::to_string(record).map_err(DrcError::YamlSerialization)?;

        let tmp_path = path.with_extension("yaml.tmp");
        fs::write(&tmp_path, yaml)
            .and_then(|()| fs::rename(&tmp_path, &path))
            .map_err(DrcError::FileWrite)
    }

    /// Stores `bytes` as the content of the latest version of `record`, then saves the record.
    ///
    /// If the save fails, a blob that no earlier version references is removed again.
    pub fn save_with_content(
        &self,
        record: &mut InformatieObjectRecord,
        bytes: &[u8],
        filename: Option<&str>,
    ) -> DrcResult<()> {
        let uuid = record.uuid.clone();
        let meta = self.store_content(&uuid, bytes, filename)?;
        let shared = record
            .versions()
            .filter_map(|v| v.content.as_ref())
            .any(|c| c.hash == meta.hash);
        record.latest_mut().content = Some(meta.clone());

        let Err(save_error) = self.save(&*record) else {
            return Ok(());
        };
        if !shared {
            let removed = FilesService::new(&self.cfg.documenten_dir(), uuid.clone())
                .and_then(|files| files.remove(meta.hash.as_str()));
            if let Err(e) = removed {
                tracing::warn!(uuid = %uuid, "failed to remove orphaned content: {e}");
            }
        }
        Err(save_error)
    }

    /// Removes a document family together with the given Verzendingen.
    ///
    /// Every directory is first moved under the store's removal area. If one move fails the
    /// directories already moved are put back, so either all records disappear or none do.
    pub fn remove_family(
        &self,
        family: &ShardableUuid,
        verzendingen: &[ShardableUuid],
    ) -> DrcResult<()> {
        let family_dir = self.record_dir::<InformatieObjectRecord>(family);
        if !family_dir.is_dir() {
            return Err(DrcError::not_found(
                InformatieObjectRecord::KIND,
                family.to_string(),
            ));
        }

        let removal_dir = self.cfg.data_dir().join(REMOVAL_DIR_NAME);
        fs::create_dir_all(&removal_dir).map_err(DrcError::FileRemove)?;

        let targets = std::iter::once((InformatieObjectRecord::KIND, family_dir)).chain(
            verzendingen
                .iter()
                .map(|uuid| (Verzending::KIND, self.record_dir::<Verzending>(uuid))),
        );

        let mut moved: Vec<(PathBuf, PathBuf)> = Vec::new();
        for (kind, dir) in targets {
            let Some(name) = dir.file_name() else {
                continue;
            };
            let aside = removal_dir.join(format!("{kind}-{}", name.to_string_lossy()));
            if let Err(e) = fs::rename(&dir, &aside) {
                for (original, aside) in moved.iter().rev() {
                    if let Err(restore) = fs::rename(aside, original) {
                        tracing::warn!(
                            "failed to restore {} after aborted removal: {restore}",
                            original.display()
                        );
                    }
                }
                return Err(DrcError::FileRemove(e));
            }
            moved.push((dir, aside));
        }

        for (_, aside) in moved {
            if let Err(e) = fs::remove_dir_all(&aside) {
                tracing::warn!("failed to purge {}: {e}", aside.display());
            }
        }
        Ok(())
    }

    /// Removes a record together with everything in its directory.
    pub fn remove<R: Record>(&self, uuid: &ShardableUuid) -> DrcResult<()> {
        let record_dir = self.record_dir::<R>(uuid);
        if !record_dir.is_dir() {
            return Err(DrcError::not_found(R::KIND, uuid.to_string()));
        }
        fs::remove_dir_all(&record_dir).map_err(DrcError::FileRemove)
    }

    /// Stores decoded content in an existing document family.
    pub fn store_content(
        &self,
        family: &ShardableUuid,
        bytes: &[u8],
        filename: Option<&str>,
    ) -> DrcResult<FileMetadata> {
        let files = FilesService::new(&self.cfg.documenten_dir(), family.clone())?;
        Ok(files.add_bytes(bytes, filename)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{store, verzending, version};
    use tempfile::TempDir;

    #[tokio::test]
    async fn insert_load_and_list_documents() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());

        let uuid = ShardableUuid::new();
        let mut record = InformatieObjectRecord::new(uuid.clone(), version("DOCUMENT-A"));
        {
            let tx = store.transaction().await;
            tx.insert_informatieobject(&mut record, Some((b"some content", Some("a.txt"))))
                .unwrap();
        }

        let loaded: InformatieObjectRecord = store.get(&uuid).unwrap();
        assert_eq!(loaded, record);
        let content = loaded.latest().content.as_ref().expect("content stored");
        assert_eq!(store.read_content(&uuid, content).unwrap(), b"some content");

        assert_eq!(store.list::<InformatieObjectRecord>().len(), 1);
        assert!(uuid
            .sharded_dir(&store.cfg().documenten_dir())
            .join(INFORMATIEOBJECT_YAML_FILENAME)
            .is_file());
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());

        let uuid = ShardableUuid::new();
        assert!(store.load::<Verzending>(&uuid).unwrap().is_none());
        assert!(matches!(
            store.get::<Verzending>(&uuid),
            Err(DrcError::NotFound { kind: "verzending", .. })
        ));

        let tx = store.transaction().await;
        assert!(matches!(
            tx.remove::<Verzending>(&uuid),
            Err(DrcError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn remove_deletes_family_and_content() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());

        let uuid = ShardableUuid::new();
        let mut record = InformatieObjectRecord::new(uuid.clone(), version("DOCUMENT-A"));
        let tx = store.transaction().await;
        tx.insert_informatieobject(&mut record, Some((b"bytes", None)))
            .unwrap();
        tx.remove::<InformatieObjectRecord>(&uuid).unwrap();

        assert!(!uuid.sharded_dir(&tx.cfg().documenten_dir()).exists());
        assert!(tx.list::<InformatieObjectRecord>().is_empty());
    }

    #[tokio::test]
    async fn list_skips_unparsable_records() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());

        let broken = ShardableUuid::new().sharded_dir(&store.cfg().verzendingen_dir());
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(VERZENDING_YAML_FILENAME), "not: [valid").unwrap();

        assert!(store.list::<Verzending>().is_empty());
        assert!(matches!(
            store.list_strict::<Verzending>(),
            Err(DrcError::YamlDeserialization(_))
        ));
    }

    #[tokio::test]
    async fn relation_lookup_fails_on_unparsable_relation() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());

        let broken = ShardableUuid::new().sharded_dir(&store.cfg().relations_dir());
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(RELATION_YAML_FILENAME), "informatieobject: [").unwrap();

        assert!(store.relations_for(&ShardableUuid::new()).is_err());
    }

    fn count_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .map(|entries| {
                entries
                    .flatten()
                    .map(|e| {
                        let path = e.path();
                        if path.is_dir() {
                            count_files(&path)
                        } else {
                            1
                        }
                    })
                    .sum()
            })
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn failed_save_removes_new_content() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());

        let uuid = ShardableUuid::new();
        let mut record = InformatieObjectRecord::new(uuid.clone(), version("DOCUMENT-A"));
        let tx = store.transaction().await;
        tx.insert_informatieobject(&mut record, Some((b"first", None)))
            .unwrap();

        let record_dir = uuid.sharded_dir(&tx.cfg().documenten_dir());
        let files_dir = record_dir.join("files");
        assert_eq!(count_files(&files_dir), 1);

        // A directory in place of the temporary file makes the record write fail.
        fs::create_dir_all(record_dir.join("informatieobject.yaml.tmp")).unwrap();

        let mut next = record.latest().clone();
        next.content = None;
        record.push_version(next);
        assert!(tx.save_with_content(&mut record, b"second", None).is_err());
        assert_eq!(count_files(&files_dir), 1);

        let mut again = record.clone();
        assert!(tx.save_with_content(&mut again, b"first", None).is_err());
        assert_eq!(count_files(&files_dir), 1, "shared content is kept");
    }

    #[tokio::test]
    async fn remove_family_takes_verzendingen_along() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());

        let uuid = ShardableUuid::new();
        let mut record = InformatieObjectRecord::new(uuid.clone(), version("DOCUMENT-A"));
        let sent = verzending(&uuid);
        let tx = store.transaction().await;
        tx.insert_informatieobject(&mut record, Some((b"bytes", None)))
            .unwrap();
        tx.insert(&sent).unwrap();

        let removal_dir = tx.cfg().data_dir().join(REMOVAL_DIR_NAME);
        fs::create_dir_all(&removal_dir).unwrap();
        let blocker = removal_dir.join(format!("verzending-{}", sent.uuid));
        fs::write(&blocker, "occupied").unwrap();

        assert!(matches!(
            tx.remove_family(&uuid, &[sent.uuid.clone()]),
            Err(DrcError::FileRemove(_))
        ));
        assert!(tx.load::<InformatieObjectRecord>(&uuid).unwrap().is_some());
        assert!(tx.load::<Verzending>(&sent.uuid).unwrap().is_some());

        fs::remove_file(&blocker).unwrap();
        tx.remove_family(&uuid, &[sent.uuid.clone()]).unwrap();
        assert!(tx.load::<InformatieObjectRecord>(&uuid).unwrap().is_none());
        assert!(tx.load::<Verzending>(&sent.uuid).unwrap().is_none());
        assert_eq!(count_files(&removal_dir), 0);
    }

    #[tokio::test]
    async fn identificatie_sequence_is_per_organisation() {
        let dir = TempDir::new().unwrap();
        let store = store(dir.path());
        let tx = store.transaction().await;

        let rsin = Rsin::new("159351741").unwrap();
        assert_eq!(tx.next_identificatie(&rsin, 2024), "DOCUMENT-2024-0000000001");

        let mut record =
            InformatieObjectRecord::new(ShardableUuid::new(), version("DOCUMENT-2024-0000000007"));
        tx.insert_informatieobject(&mut record, None).unwrap();

        assert_eq!(tx.next_identificatie(&rsin, 2024), "DOCUMENT-2024-0000000008");
        assert_eq!(tx.next_identificatie(&rsin, 2025), "DOCUMENT-2025-0000000001");

        let other = Rsin::new("517439943").unwrap();
        assert_eq!(tx.next_identificatie(&other, 2024), "DOCUMENT-2024-0000000001");

        assert!(tx.identificatie_in_use(&rsin, "DOCUMENT-2024-0000000007", None));
        assert!(!tx.identificatie_in_use(&rsin, "DOCUMENT-2024-0000000007", Some(&record.uuid)));
        assert!(!tx.identificatie_in_use(&other, "DOCUMENT-2024-0000000007", None));
    }
}
