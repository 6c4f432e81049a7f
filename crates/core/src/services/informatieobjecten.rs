//! Document (enkelvoudig informatieobject) operations.

use super::parse_path_uuid;
use crate::constants::NON_FIELD_ERRORS;
use crate::model::informatieobject::{
    InformatieObjectInput, InformatieObjectRecord, InformatieObjectVersion,
    Vertrouwelijkheidaanduiding,
};
use crate::store::{Store, Transaction};
use crate::validation::{is_http_url, Field, ValidationErrors, WriteMode};
use crate::validators::{
    check_can_lock, check_definitive, check_status_for_received, check_unlock,
    check_update_lock, decode_inhoud, new_lock_token, ReferenceValidator, ResourceType,
};
use crate::{DrcError, DrcResult};
use api_shared::ScopeSet;
use chrono::{Datelike, Utc};
use drc_uuid::ShardableUuid;
use std::sync::Arc;

const KIND: &str = "informatieobject";

/// One version of a document family, as returned to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub uuid: ShardableUuid,
    pub locked: bool,
    pub version: InformatieObjectVersion,
}

impl StoredDocument {
    fn new(record: &InformatieObjectRecord, version: &InformatieObjectVersion) -> Self {
        Self {
            uuid: record.uuid.clone(),
            locked: record.is_locked(),
            version: version.clone(),
        }
    }

    fn latest(record: &InformatieObjectRecord) -> Self {
        Self::new(record, record.latest())
    }
}

/// Decoded content of a document version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub bestandsnaam: Option<String>,
    pub media_type: Option<String>,
}

/// What a write does with the stored content.
enum ContentChange {
    Keep,
    Clear,
    Replace(Vec<u8>),
}

#[derive(Clone)]
pub struct InformatieObjectService {
    store: Arc<Store>,
    references: Arc<ReferenceValidator>,
}

impl InformatieObjectService {
    pub fn new(store: Arc<Store>, references: Arc<ReferenceValidator>) -> Self {
        Self { store, references }
    }

    /// Creates a document family with its first version.
    ///
    /// # Errors
    ///
    /// `DrcError::Validation` with every violation found; storage errors otherwise.
    pub async fn create(&self, input: InformatieObjectInput) -> DrcResult<StoredDocument> {
        let mut errors = ValidationErrors::new();
        let default_vertrouwelijkheid = self
            .check_informatieobjecttype(&input.informatieobjecttype, &mut errors)
            .await;

        let tx = self.store.transaction().await;
        let (version, content) = prepare_version(
            input,
            None,
            WriteMode::Create,
            default_vertrouwelijkheid,
            errors,
            &tx,
            None,
        )?;

        let bytes = match &content {
            ContentChange::Replace(bytes) => Some(bytes.as_slice()),
            ContentChange::Keep | ContentChange::Clear => None,
        };
        let filename = version.bestandsnaam.clone();

        let mut record = InformatieObjectRecord::new(ShardableUuid::new(), version);
        tx.insert_informatieobject(&mut record, bytes.map(|b| (b, filename.as_deref())))?;

        tracing::info!(
            uuid = %record.uuid,
            identificatie = %record.latest().identificatie,
            "informatieobject created"
        );
        Ok(StoredDocument::latest(&record))
    }

    /// Reads one version; `None` selects the latest.
    pub fn get(&self, uuid: &str, versie: Option<u32>) -> DrcResult<StoredDocument> {
        let uuid = parse_path_uuid(KIND, uuid)?;
        let record: InformatieObjectRecord = self.store.get(&uuid)?;
        let version = record
            .version(versie)
            .ok_or_else(|| version_not_found(&uuid, versie))?;
        Ok(StoredDocument::new(&record, version))
    }

    /// Latest version of every document family.
    pub fn list(&self) -> Vec<StoredDocument> {
        self.store
            .list::<InformatieObjectRecord>()
            .iter()
            .map(StoredDocument::latest)
            .collect()
    }

    /// Reads the decoded content of a version.
    pub fn download(&self, uuid: &str, versie: Option<u32>) -> DrcResult<Download> {
        let uuid = parse_path_uuid(KIND, uuid)?;
        let record: InformatieObjectRecord = self.store.get(&uuid)?;
        let version = record
            .version(versie)
            .ok_or_else(|| version_not_found(&uuid, versie))?;
        let Some(meta) = &version.content else {
            return Err(DrcError::not_found("inhoud", uuid.to_string()));
        };

        Ok(Download {
            bytes: self.store.read_content(&uuid, meta)?,
            bestandsnaam: version
                .bestandsnaam
                .clone()
                .or_else(|| meta.original_filename.as_ref().map(|n| n.to_string())),
            media_type: version
                .formaat
                .clone()
                .or_else(|| meta.media_type.as_ref().map(|m| m.to_string())),
        })
    }

    /// Writes a new version of a locked document.
    ///
    /// The request must carry the current lock token. A family whose latest version is
    /// `definitief` only accepts writes from callers holding the override scope.
    pub async fn update(
        &self,
        uuid: &str,
        input: InformatieObjectInput,
        mode: WriteMode,
        scopes: &ScopeSet,
    ) -> DrcResult<StoredDocument> {
        let uuid = parse_path_uuid(KIND, uuid)?;

        let mut errors = ValidationErrors::new();
        let default_vertrouwelijkheid = self
            .check_informatieobjecttype(&input.informatieobjecttype, &mut errors)
            .await;

        let tx = self.store.transaction().await;
        let mut record: InformatieObjectRecord = tx.get(&uuid)?;

        if let Err(e) = check_update_lock(record.lock.as_deref(), &input.lock) {
            errors.add(e);
        }
        if let Err(e) = check_definitive(record.latest().status, scopes) {
            errors.add(e);
        }

        let (version, content) = prepare_version(
            input,
            Some(record.latest()),
            mode,
            default_vertrouwelijkheid,
            errors,
            &tx,
            Some(&uuid),
        )?;

        let mut version = version;
        let filename = version.bestandsnaam.clone();
        let replacement = match content {
            ContentChange::Keep => None,
            ContentChange::Clear => {
                version.content = None;
                None
            }
            ContentChange::Replace(bytes) => Some(bytes),
        };

        record.push_version(version);
        match replacement {
            Some(bytes) => tx.save_with_content(&mut record, &bytes, filename.as_deref())?,
            None => tx.save(&record)?,
        }

        tracing::info!(uuid = %uuid, versie = record.latest().versie, "informatieobject updated");
        Ok(StoredDocument::latest(&record))
    }

    /// Checks a document out and returns the lock token.
    pub async fn lock(&self, uuid: &str) -> DrcResult<String> {
        let uuid = parse_path_uuid(KIND, uuid)?;
        let tx = self.store.transaction().await;
        let mut record: InformatieObjectRecord = tx.get(&uuid)?;

        check_can_lock(record.lock.as_deref())?;

        let token = new_lock_token();
        record.lock = Some(token.clone());
        tx.save(&record)?;

        tracing::info!(uuid = %uuid, "informatieobject locked");
        Ok(token)
    }

    /// Releases the lock. Without the force-unlock scope `lock` must match the stored token.
    pub async fn unlock(&self, uuid: &str, lock: Option<&str>, scopes: &ScopeSet) -> DrcResult<()> {
        let uuid = parse_path_uuid(KIND, uuid)?;
        let tx = self.store.transaction().await;
        let mut record: InformatieObjectRecord = tx.get(&uuid)?;

        check_unlock(record.lock.as_deref(), lock, scopes)?;

        if record.lock.take().is_some() {
            tx.save(&record)?;
            tracing::info!(uuid = %uuid, "informatieobject unlocked");
        }
        Ok(())
    }

    /// Deletes a document family, its content and its Verzendingen.
    ///
    /// Refused with `pending-relations` while relations to zaken or besluiten exist.
    pub async fn delete(&self, uuid: &str) -> DrcResult<()> {
        let uuid = parse_path_uuid(KIND, uuid)?;
        let tx = self.store.transaction().await;
        let _: InformatieObjectRecord = tx.get(&uuid)?;

        if !tx.relations_for(&uuid)?.is_empty() {
            return Err(ValidationErrors::single(
                NON_FIELD_ERRORS,
                "pending-relations",
                "All relations to zaken and besluiten must be removed before the document can be deleted.",
            )
            .into());
        }

        let verzendingen: Vec<_> = tx
            .verzendingen_for(&uuid)?
            .into_iter()
            .map(|v| v.uuid)
            .collect();
        tx.remove_family(&uuid, &verzendingen)?;

        tracing::info!(uuid = %uuid, "informatieobject deleted");
        Ok(())
    }

    /// Validates a supplied informatieobjecttype URL against its catalogue.
    ///
    /// Returns the type's default confidentiality. Malformed URLs are left to field validation.
    async fn check_informatieobjecttype(
        &self,
        field: &Field<String>,
        errors: &mut ValidationErrors,
    ) -> Option<Vertrouwelijkheidaanduiding> {
        let url = field.value().filter(|url| is_http_url(url))?;
        match self
            .references
            .validate(
                "informatieobjecttype",
                url,
                ResourceType::InformatieObjectType,
                true,
            )
            .await
        {
            Ok(resource) => resource
                .get("vertrouwelijkheidaanduiding")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok()),
            Err(e) => {
                errors.add(e);
                None
            }
        }
    }
}

/// Validates a write and produces the version to store.
///
/// `errors` may already hold violations found before the transaction; they are reported
/// together with the field errors.
fn prepare_version(
    mut input: InformatieObjectInput,
    stored: Option<&InformatieObjectVersion>,
    mode: WriteMode,
    default_vertrouwelijkheid: Option<Vertrouwelijkheidaanduiding>,
    mut errors: ValidationErrors,
    tx: &Transaction<'_>,
    family: Option<&ShardableUuid>,
) -> DrcResult<(InformatieObjectVersion, ContentChange)> {
    let inhoud = std::mem::take(&mut input.inhoud);
    let declared_size = input.bestandsomvang.value().copied();

    let version = input.resolve(stored, mode, default_vertrouwelijkheid, &mut errors);

    let content = match inhoud {
        Field::Value(encoded) if !encoded.is_empty() => {
            match decode_inhoud(&encoded, declared_size) {
                Ok(bytes) => ContentChange::Replace(bytes),
                Err(e) => {
                    errors.add(e);
                    ContentChange::Keep
                }
            }
        }
        Field::Value(_) | Field::Null => ContentChange::Clear,
        Field::Absent => ContentChange::Keep,
    };

    let Some(mut version) = version else {
        return Err(errors.into());
    };

    if let Err(e) = check_status_for_received(version.status, version.ontvangstdatum) {
        errors.add(e);
    }

    if version.identificatie.is_empty() {
        version.identificatie = match stored {
            Some(previous) => previous.identificatie.clone(),
            None => tx.next_identificatie(&version.bronorganisatie, version.creatiedatum.year()),
        };
    } else if tx.identificatie_in_use(&version.bronorganisatie, &version.identificatie, family) {
        errors.push(
            "identificatie",
            "identificatie-niet-uniek",
            "The identificatie is already used for this bronorganisatie.",
        );
    }

    errors.finish()?;

    match &content {
        ContentChange::Replace(bytes) => version.bestandsomvang = Some(bytes.len() as u64),
        ContentChange::Clear => version.bestandsomvang = None,
        ContentChange::Keep => {
            if let Some(meta) = &version.content {
                version.bestandsomvang = Some(meta.size_bytes);
            }
        }
    }
    version.begin_registratie = Utc::now();
    Ok((version, content))
}

fn version_not_found(uuid: &ShardableUuid, versie: Option<u32>) -> DrcError {
    match versie {
        Some(n) => DrcError::not_found(KIND, format!("{uuid} (versie {n})")),
        None => DrcError::not_found(KIND, uuid.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectInformatieObject, ObjectType, Status};
    use crate::test_support::{references, store, CONCEPT_IOTYPE, IOTYPE, ZAAK};
    use api_shared::Scope;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> InformatieObjectService {
        InformatieObjectService::new(Arc::new(store(dir.path())), references())
    }

    fn input(body: Value) -> InformatieObjectInput {
        serde_json::from_value(body).expect("valid body")
    }

    fn body() -> Value {
        json!({
            "identificatie": "AMS20180701001",
            "bronorganisatie": "159351741",
            "creatiedatum": "2018-07-01",
            "titel": "text_extra.txt",
            "auteur": "ANONIEM",
            "formaat": "text/plain",
            "taal": "dut",
            "inhoud": "aGVsbG8gd29ybGQ=",
            "informatieobjecttype": IOTYPE,
            "vertrouwelijkheidaanduiding": "openbaar",
        })
    }

    fn codes(err: DrcError) -> Vec<(String, String)> {
        match err {
            DrcError::Validation(errors) => errors
                .into_vec()
                .into_iter()
                .map(|e| (e.name, e.code))
                .collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn pair(name: &str, code: &str) -> (String, String) {
        (name.to_string(), code.to_string())
    }

    fn editor() -> ScopeSet {
        ScopeSet::new([Scope::Read, Scope::Update, Scope::Lock])
    }

    #[tokio::test]
    async fn create_stores_version_one_with_content() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        let doc = svc.create(input(body())).await.unwrap();
        assert_eq!(doc.version.versie, 1);
        assert_eq!(doc.version.bestandsomvang, Some(11));
        assert!(!doc.locked);

        let download = svc.download(&doc.uuid.to_string(), None).unwrap();
        assert_eq!(download.bytes, b"hello world");
        assert_eq!(download.media_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn create_generates_identificatie_and_default_confidentiality() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        let mut body = body();
        let fields = body.as_object_mut().unwrap();
        fields.remove("identificatie");
        fields.remove("vertrouwelijkheidaanduiding");

        let doc = svc.create(input(body)).await.unwrap();
        assert_eq!(doc.version.identificatie, "DOCUMENT-2018-0000000001");
        assert_eq!(
            doc.version.vertrouwelijkheidaanduiding,
            Vertrouwelijkheidaanduiding::Zaakvertrouwelijk
        );
    }

    #[tokio::test]
    async fn create_rejects_duplicate_identificatie() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        svc.create(input(body())).await.unwrap();
        let err = svc.create(input(body())).await.unwrap_err();
        assert_eq!(codes(err), vec![pair("identificatie", "identificatie-niet-uniek")]);
    }

    #[tokio::test]
    async fn create_rejects_bad_informatieobjecttype() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        let mut unreachable = body();
        unreachable["informatieobjecttype"] = json!("https://example.com/unknown");
        let err = svc.create(input(unreachable)).await.unwrap_err();
        assert_eq!(codes(err), vec![pair("informatieobjecttype", "invalid")]);

        let mut concept = body();
        concept["informatieobjecttype"] = json!(CONCEPT_IOTYPE);
        let err = svc.create(input(concept)).await.unwrap_err();
        assert_eq!(codes(err), vec![pair("informatieobjecttype", "not-published")]);

        let mut zaak = body();
        zaak["informatieobjecttype"] = json!(ZAAK);
        let err = svc.create(input(zaak)).await.unwrap_err();
        assert_eq!(codes(err), vec![pair("informatieobjecttype", "invalid-resource")]);
    }

    #[tokio::test]
    async fn create_rejects_bad_content() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        let mut padding = body();
        padding["inhoud"] = json!("aGVsbG8gd29ybGQ");
        let err = svc.create(input(padding)).await.unwrap_err();
        assert_eq!(codes(err), vec![pair("inhoud", "incorrect-base64-padding")]);

        let mut size = body();
        size["bestandsomvang"] = json!(5);
        let err = svc.create(input(size)).await.unwrap_err();
        assert_eq!(codes(err), vec![pair("bestandsomvang", "file-size")]);

        assert!(svc.list().is_empty());
    }

    #[tokio::test]
    async fn create_applies_status_rule() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        for status in ["in_bewerking", "ter_vaststelling"] {
            let mut received = body();
            received["identificatie"] = json!(format!("RECEIVED-{status}"));
            received["ontvangstdatum"] = json!("2018-07-02");
            received["status"] = json!(status);
            let err = svc.create(input(received)).await.unwrap_err();
            assert_eq!(codes(err), vec![pair("status", "invalid_for_received")]);
        }

        let mut received = body();
        received["ontvangstdatum"] = json!("2018-07-02");
        received["status"] = json!("definitief");
        assert!(svc.create(input(received)).await.is_ok());
    }

    #[tokio::test]
    async fn update_requires_lock() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let id = svc.create(input(body())).await.unwrap().uuid.to_string();

        let err = svc
            .update(&id, input(json!({"titel": "changed"})), WriteMode::PartialUpdate, &editor())
            .await
            .unwrap_err();
        assert_eq!(codes(err), vec![pair(NON_FIELD_ERRORS, "unlocked")]);

        let token = svc.lock(&id).await.unwrap();

        let err = svc
            .update(&id, input(json!({"titel": "changed"})), WriteMode::PartialUpdate, &editor())
            .await
            .unwrap_err();
        assert_eq!(codes(err), vec![pair("lock", "required")]);

        let err = svc
            .update(
                &id,
                input(json!({"titel": "changed", "lock": "0123456789abcdef"})),
                WriteMode::PartialUpdate,
                &editor(),
            )
            .await
            .unwrap_err();
        assert_eq!(codes(err), vec![pair(NON_FIELD_ERRORS, "incorrect-lock-id")]);

        let doc = svc
            .update(
                &id,
                input(json!({"titel": "changed", "lock": token})),
                WriteMode::PartialUpdate,
                &editor(),
            )
            .await
            .unwrap();
        assert_eq!(doc.version.versie, 2);
        assert_eq!(doc.version.titel, "changed");
        assert!(doc.locked);

        let first = svc.get(&id, Some(1)).unwrap();
        assert_eq!(first.version.titel, "text_extra.txt");
    }

    #[tokio::test]
    async fn partial_update_keeps_content_and_replaces_it_on_request() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let id = svc.create(input(body())).await.unwrap().uuid.to_string();
        let token = svc.lock(&id).await.unwrap();

        svc.update(&id, input(json!({"lock": token})), WriteMode::PartialUpdate, &editor())
            .await
            .unwrap();
        assert_eq!(svc.download(&id, Some(2)).unwrap().bytes, b"hello world");

        let doc = svc
            .update(
                &id,
                input(json!({"lock": token, "inhoud": "Zm9v"})),
                WriteMode::PartialUpdate,
                &editor(),
            )
            .await
            .unwrap();
        assert_eq!(doc.version.bestandsomvang, Some(3));
        assert_eq!(svc.download(&id, None).unwrap().bytes, b"foo");
        assert_eq!(svc.download(&id, Some(1)).unwrap().bytes, b"hello world");
    }

    #[tokio::test]
    async fn status_rule_uses_effective_state() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let mut created = body();
        created["status"] = json!("in_bewerking");
        let id = svc.create(input(created)).await.unwrap().uuid.to_string();
        let token = svc.lock(&id).await.unwrap();

        let err = svc
            .update(
                &id,
                input(json!({"lock": token, "ontvangstdatum": "2018-07-02"})),
                WriteMode::PartialUpdate,
                &editor(),
            )
            .await
            .unwrap_err();
        assert_eq!(codes(err), vec![pair("status", "invalid_for_received")]);
    }

    #[tokio::test]
    async fn definitive_documents_need_override_scope() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let mut created = body();
        created["status"] = json!("definitief");
        let id = svc.create(input(created)).await.unwrap().uuid.to_string();
        let token = svc.lock(&id).await.unwrap();

        let patch = json!({"titel": "changed", "lock": token});
        let err = svc
            .update(&id, input(patch.clone()), WriteMode::PartialUpdate, &editor())
            .await
            .unwrap_err();
        assert_eq!(codes(err), vec![pair(NON_FIELD_ERRORS, "modify-status-definitive")]);

        let mut forced = editor().iter().collect::<Vec<_>>();
        forced.push(Scope::ForceUpdate);
        let doc = svc
            .update(&id, input(patch), WriteMode::PartialUpdate, &ScopeSet::new(forced))
            .await
            .unwrap();
        assert_eq!(doc.version.status, Some(Status::Definitief));
        assert_eq!(doc.version.versie, 2);
    }

    #[tokio::test]
    async fn lock_and_unlock() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let id = svc.create(input(body())).await.unwrap().uuid.to_string();

        let token = svc.lock(&id).await.unwrap();
        let err = svc.lock(&id).await.unwrap_err();
        assert_eq!(codes(err), vec![pair(NON_FIELD_ERRORS, "existing-lock")]);

        let err = svc.unlock(&id, Some("wrong"), &editor()).await.unwrap_err();
        assert_eq!(codes(err), vec![pair(NON_FIELD_ERRORS, "incorrect-lock-id")]);

        svc.unlock(&id, Some(&token), &editor()).await.unwrap();
        assert!(!svc.get(&id, None).unwrap().locked);

        svc.lock(&id).await.unwrap();
        svc.unlock(&id, None, &ScopeSet::new([Scope::ForceUnlock]))
            .await
            .unwrap();
        assert!(!svc.get(&id, None).unwrap().locked);
    }

    #[tokio::test]
    async fn delete_is_blocked_by_relations() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store(dir.path()));
        let svc = InformatieObjectService::new(store.clone(), references());
        let doc = svc.create(input(body())).await.unwrap();
        let id = doc.uuid.to_string();

        let relation = ObjectInformatieObject {
            uuid: ShardableUuid::new(),
            informatieobject: doc.uuid.clone(),
            object: ZAAK.into(),
            object_type: ObjectType::Zaak,
            registratiedatum: Utc::now(),
        };
        store.transaction().await.insert(&relation).unwrap();

        let err = svc.delete(&id).await.unwrap_err();
        assert_eq!(codes(err), vec![pair(NON_FIELD_ERRORS, "pending-relations")]);

        store
            .transaction()
            .await
            .remove::<ObjectInformatieObject>(&relation.uuid)
            .unwrap();
        svc.delete(&id).await.unwrap();
        assert!(matches!(svc.get(&id, None), Err(DrcError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delete_refuses_when_relations_cannot_be_read() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store(dir.path()));
        let svc = InformatieObjectService::new(store.clone(), references());
        let id = svc.create(input(body())).await.unwrap().uuid.to_string();

        let broken = ShardableUuid::new().sharded_dir(&store.cfg().relations_dir());
        std::fs::create_dir_all(&broken).unwrap();
        std::fs::write(
            broken.join(crate::constants::RELATION_YAML_FILENAME),
            "informatieobject: [",
        )
        .unwrap();

        assert!(matches!(
            svc.delete(&id).await,
            Err(DrcError::YamlDeserialization(_))
        ));
        assert!(svc.get(&id, None).is_ok());
    }

    #[tokio::test]
    async fn unknown_documents_and_versions_are_not_found() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let id = svc.create(input(body())).await.unwrap().uuid.to_string();

        assert!(matches!(svc.get(&id, Some(7)), Err(DrcError::NotFound { .. })));
        assert!(matches!(svc.get("nope", None), Err(DrcError::NotFound { .. })));
        assert!(matches!(
            svc.lock(&ShardableUuid::new().to_string()).await,
            Err(DrcError::NotFound { .. })
        ));
    }
}
