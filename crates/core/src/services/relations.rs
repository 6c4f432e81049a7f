//! ObjectInformatieObject operations.

use super::{informatieobject_uuid_from_url, parse_path_uuid, resolve_local_informatieobject};
use crate::constants::NON_FIELD_ERRORS;
use crate::model::relation::{ObjectInformatieObject, ObjectType, RelationFilter, RelationInput};
use crate::store::Store;
use crate::sync::{EventPublisher, RelationEvent};
use crate::validation::{choice, required_text, url, ValidationErrors, WriteMode};
use crate::validators::ReferenceValidator;
use crate::DrcResult;
use chrono::Utc;
use drc_uuid::ShardableUuid;
use std::sync::Arc;

const KIND: &str = "objectinformatieobject";

#[derive(Clone)]
pub struct RelationService {
    store: Arc<Store>,
    references: Arc<ReferenceValidator>,
    events: Option<EventPublisher>,
}

impl RelationService {
    /// `events` is `None` when relation synchronisation is disabled.
    pub fn new(
        store: Arc<Store>,
        references: Arc<ReferenceValidator>,
        events: Option<EventPublisher>,
    ) -> Self {
        Self {
            store,
            references,
            events,
        }
    }

    /// Relates a document to a remote zaak or besluit.
    pub async fn create(&self, input: RelationInput) -> DrcResult<ObjectInformatieObject> {
        let mut errors = ValidationErrors::new();
        let create = WriteMode::Create;

        let object_type = required_text(&mut errors, "objectType", input.object_type, None, create, 32)
            .and_then(|raw| choice::<ObjectType>(&mut errors, "objectType", raw));
        let object = required_text(&mut errors, "object", input.object, None, create, 1000);

        let object = match (object, object_type) {
            (Some(object), Some(kind)) => match self
                .references
                .validate("object", &object, kind.resource_type(), false)
                .await
            {
                Ok(_) => Some(object),
                Err(e) => {
                    errors.add(e);
                    None
                }
            },
            (Some(object), None) => url(&mut errors, "object", object),
            (None, _) => None,
        };

        let tx = self.store.transaction().await;

        let informatieobject = required_text(
            &mut errors,
            "informatieobject",
            input.informatieobject,
            None,
            create,
            1000,
        )
        .and_then(
            |raw| match resolve_local_informatieobject(&tx, "informatieobject", &raw) {
                Ok(family) => Some(family),
                Err(e) => {
                    errors.add(e);
                    None
                }
            },
        );

        if let (Some(family), Some(object)) = (&informatieobject, &object) {
            let duplicate = tx
                .relations_for(family)?
                .iter()
                .any(|r| &r.object == object);
            if duplicate {
                errors.push(
                    NON_FIELD_ERRORS,
                    "unique",
                    "The fields informatieobject, object must make a unique set.",
                );
            }
        }

        let (Some(informatieobject), Some(object), Some(object_type)) =
            (informatieobject, object, object_type)
        else {
            return Err(errors.into());
        };
        errors.finish()?;

        let relation = ObjectInformatieObject {
            uuid: ShardableUuid::new(),
            informatieobject,
            object,
            object_type,
            registratiedatum: Utc::now(),
        };
        tx.insert(&relation)?;
        drop(tx);

        tracing::info!(
            uuid = %relation.uuid,
            object = %relation.object,
            "objectinformatieobject created"
        );
        self.publish(RelationEvent::Created {
            informatieobject_url: self.store.cfg().informatieobject_url(&relation.informatieobject),
            object: relation.object.clone(),
            object_type: relation.object_type,
        });
        Ok(relation)
    }

    pub fn get(&self, uuid: &str) -> DrcResult<ObjectInformatieObject> {
        let uuid = parse_path_uuid(KIND, uuid)?;
        self.store.get(&uuid)
    }

    /// Relations matching every filter that is set.
    pub fn list(&self, filter: &RelationFilter) -> Vec<ObjectInformatieObject> {
        let family = filter
            .informatieobject
            .as_deref()
            .map(informatieobject_uuid_from_url);

        self.store
            .list::<ObjectInformatieObject>()
            .into_iter()
            .filter(|r| filter.object.as_ref().map_or(true, |o| &r.object == o))
            .filter(|r| {
                family
                    .as_ref()
                    .map_or(true, |f| f.as_ref() == Some(&r.informatieobject))
            })
            .collect()
    }

    pub async fn delete(&self, uuid: &str) -> DrcResult<()> {
        let uuid = parse_path_uuid(KIND, uuid)?;
        let tx = self.store.transaction().await;
        let relation: ObjectInformatieObject = tx.get(&uuid)?;
        tx.remove::<ObjectInformatieObject>(&uuid)?;
        drop(tx);

        tracing::info!(uuid = %uuid, "objectinformatieobject deleted");
        self.publish(RelationEvent::Deleted {
            informatieobject_url: self.store.cfg().informatieobject_url(&relation.informatieobject),
            object: relation.object,
            object_type: relation.object_type,
        });
        Ok(())
    }

    fn publish(&self, event: RelationEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InformatieObjectRecord;
    use crate::sync::channel;
    use crate::test_support::{references, store, version, BESLUIT, IOTYPE, ZAAK};
    use crate::DrcError;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tempfile::TempDir;
    use tokio::sync::mpsc::Receiver;

    struct Fixture {
        _dir: TempDir,
        svc: RelationService,
        events: Receiver<RelationEvent>,
        document_url: String,
    }

    async fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store(dir.path()));

        let mut record = InformatieObjectRecord::new(ShardableUuid::new(), version("DOC-1"));
        store
            .transaction()
            .await
            .insert_informatieobject(&mut record, None)
            .unwrap();
        let document_url = store.cfg().informatieobject_url(&record.uuid);

        let (publisher, events) = channel(16);
        Fixture {
            _dir: dir,
            svc: RelationService::new(store, references(), Some(publisher)),
            events,
            document_url,
        }
    }

    fn input(body: Value) -> RelationInput {
        serde_json::from_value(body).expect("valid body")
    }

    fn validation(err: DrcError) -> ValidationErrors {
        match err {
            DrcError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_publishes_event() {
        let mut fx = fixture().await;
        let relation = fx
            .svc
            .create(input(json!({
                "informatieobject": fx.document_url,
                "object": ZAAK,
                "objectType": "zaak",
            })))
            .await
            .unwrap();

        assert_eq!(relation.object_type, ObjectType::Zaak);
        assert_eq!(
            fx.events.try_recv().unwrap(),
            RelationEvent::Created {
                informatieobject_url: fx.document_url.clone(),
                object: ZAAK.into(),
                object_type: ObjectType::Zaak,
            }
        );

        fx.svc.delete(&relation.uuid.to_string()).await.unwrap();
        assert!(matches!(
            fx.events.try_recv().unwrap(),
            RelationEvent::Deleted { .. }
        ));
    }

    #[tokio::test]
    async fn duplicate_relation_is_rejected() {
        let fx = fixture().await;
        let body = json!({
            "informatieobject": fx.document_url,
            "object": BESLUIT,
            "objectType": "besluit",
        });
        fx.svc.create(input(body.clone())).await.unwrap();

        let errors = validation(fx.svc.create(input(body)).await.unwrap_err());
        assert_eq!(errors.get(NON_FIELD_ERRORS).unwrap().code, "unique");
    }

    #[tokio::test]
    async fn object_must_match_object_type() {
        let fx = fixture().await;

        let errors = validation(
            fx.svc
                .create(input(json!({
                    "informatieobject": fx.document_url,
                    "object": IOTYPE,
                    "objectType": "zaak",
                })))
                .await
                .unwrap_err(),
        );
        assert_eq!(errors.get("object").unwrap().code, "invalid-resource");

        let errors = validation(
            fx.svc
                .create(input(json!({
                    "informatieobject": fx.document_url,
                    "object": "https://example.com/unreachable",
                    "objectType": "besluit",
                })))
                .await
                .unwrap_err(),
        );
        assert_eq!(errors.get("object").unwrap().code, "invalid");

        let errors = validation(
            fx.svc
                .create(input(json!({
                    "informatieobject": fx.document_url,
                    "object": ZAAK,
                    "objectType": "verzoek",
                })))
                .await
                .unwrap_err(),
        );
        assert_eq!(errors.get("objectType").unwrap().code, "invalid_choice");
    }

    #[tokio::test]
    async fn list_filters_by_object_and_document() {
        let fx = fixture().await;
        for (object, kind) in [(ZAAK, "zaak"), (BESLUIT, "besluit")] {
            fx.svc
                .create(input(json!({
                    "informatieobject": fx.document_url,
                    "object": object,
                    "objectType": kind,
                })))
                .await
                .unwrap();
        }

        assert_eq!(fx.svc.list(&RelationFilter::default()).len(), 2);

        let query = HashMap::from([("object".to_string(), ZAAK.to_string())]);
        let by_object = fx.svc.list(&RelationFilter::from_query(&query).unwrap());
        assert_eq!(by_object.len(), 1);
        assert_eq!(by_object[0].object, ZAAK);

        let query = HashMap::from([("informatieobject".to_string(), fx.document_url.clone())]);
        assert_eq!(fx.svc.list(&RelationFilter::from_query(&query).unwrap()).len(), 2);

        let other = format!(
            "http://testserver/api/v1/enkelvoudiginformatieobjecten/{}",
            ShardableUuid::new()
        );
        let query = HashMap::from([("informatieobject".to_string(), other)]);
        assert!(fx.svc.list(&RelationFilter::from_query(&query).unwrap()).is_empty());
    }
}
