use carehome_store_client::http_client::ReqwestCareStore;
use carehome_store_client::{
    CareStore, NewActivity, NewAdministrationRecord, NewFamilyContact, NewMedication, NewResident,
    NewVitalSign, StoreError,
};
use secrecy::SecretString;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> ReqwestCareStore {
    ReqwestCareStore::new(&server.uri(), SecretString::new("svc-key".into()), "residents")
}

fn new_medication() -> NewMedication {
    NewMedication {
        resident_id: "r1".into(),
        med_name: "Ibuprofeno".into(),
        dosage: "400mg".into(),
        frequency: "cada 8 horas".into(),
        scheduled_time: None,
        notes: Some("con comida".into()),
    }
}

#[tokio::test]
async fn create_medication_posts_body_and_returns_row() {
    let server = MockServer::start().await;
    let created = serde_json::json!({
        "id": "m9",
        "resident_id": "r1",
        "med_name": "Ibuprofeno",
        "dosage": "400mg",
        "frequency": "cada 8 horas",
        "scheduled_time": null,
        "notes": "con comida"
    });
    Mock::given(method("POST"))
        .and(path("/rest/v1/medications"))
        .and(header("Prefer", "return=representation"))
        .and(body_json(&new_medication()))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([created])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let med = store.create_medication(new_medication()).await.expect("created");
    assert_eq!(med.id, "m9");
    assert_eq!(med.frequency, "cada 8 horas");
}

#[tokio::test]
async fn update_medication_with_empty_representation_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/medications"))
        .and(query_param("id", "eq.m404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let err = store
        .update_medication("m404", new_medication())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn delete_medication_requires_a_deleted_row() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/medications"))
        .and(query_param("id", "eq.m404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let err = store.delete_medication("m404").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn create_activity_posts_body_and_returns_row() {
    let server = MockServer::start().await;
    let activity = NewActivity {
        resident_id: "r1".into(),
        activity_type: "Recreativas".into(),
        title: "Bingo".into(),
        description: None,
        scheduled_at: "2024-03-05T16:00:00".into(),
        completed_at: None,
        status: "scheduled".into(),
        notes: None,
        registered_by: Some("staff7".into()),
    };
    let created = serde_json::json!({
        "id": "a9",
        "resident_id": "r1",
        "activity_type": "Recreativas",
        "title": "Bingo",
        "description": null,
        "scheduled_at": "2024-03-05T16:00:00",
        "completed_at": null,
        "status": "scheduled",
        "notes": null,
        "registered_by": "staff7"
    });
    Mock::given(method("POST"))
        .and(path("/rest/v1/activities"))
        .and(header("Prefer", "return=representation"))
        .and(body_json(&activity))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([created])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let saved = store.create_activity(activity).await.expect("created");
    assert_eq!(saved.id, "a9");
    assert_eq!(saved.title, "Bingo");
}

#[tokio::test]
async fn update_activity_with_empty_representation_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/activities"))
        .and(query_param("id", "eq.a404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let err = store
        .update_activity(
            "a404",
            NewActivity {
                resident_id: "r1".into(),
                activity_type: "Recreativas".into(),
                title: "Bingo".into(),
                description: None,
                scheduled_at: "2024-03-05T16:00:00".into(),
                completed_at: Some("2024-03-05T17:00:00".into()),
                status: "completed".into(),
                notes: None,
                registered_by: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn update_vital_sign_patches_row_by_id() {
    let server = MockServer::start().await;
    let vital = NewVitalSign {
        resident_id: "r1".into(),
        recorded_at: "2024-03-05T07:30:00".into(),
        blood_pressure: Some("118/78".into()),
        temperature: Some(36.4),
        pulse: Some(70),
        recorded_by_user_id: Some("staff7".into()),
        notes: None,
    };
    let updated = serde_json::json!({
        "id": "v1",
        "resident_id": "r1",
        "recorded_at": "2024-03-05T07:30:00",
        "blood_pressure": "118/78",
        "temperature": 36.4,
        "pulse": 70,
        "recorded_by_user_id": "staff7",
        "notes": null
    });
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/vital_signs"))
        .and(query_param("id", "eq.v1"))
        .and(body_json(&vital))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([updated])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let saved = store.update_vital_sign("v1", vital).await.expect("updated");
    assert_eq!(saved.id, "v1");
    assert_eq!(saved.blood_pressure.as_deref(), Some("118/78"));
}

#[tokio::test]
async fn delete_vital_sign_requires_a_deleted_row() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/vital_signs"))
        .and(query_param("id", "eq.v404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let err = store.delete_vital_sign("v404").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn create_resident_posts_body_and_returns_row() {
    let server = MockServer::start().await;
    let resident = NewResident {
        name: "Carmen López".into(),
        status: "independent".into(),
        photo_url: None,
        emergency_contact_name: Some("María López".into()),
        emergency_contact_phone: Some("555-0102".into()),
        admission_date: "2024-03-01".into(),
        discharge_date: None,
    };
    let created = serde_json::json!({
        "id": "r9",
        "name": "Carmen López",
        "status": "independent",
        "photo_url": null,
        "emergency_contact_name": "María López",
        "emergency_contact_phone": "555-0102",
        "admission_date": "2024-03-01",
        "discharge_date": null
    });
    Mock::given(method("POST"))
        .and(path("/rest/v1/residents"))
        .and(body_json(&resident))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([created])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let saved = store.create_resident(resident).await.expect("created");
    assert_eq!(saved.id, "r9");
    assert_eq!(saved.name, "Carmen López");
}

#[tokio::test]
async fn delete_resident_requires_a_deleted_row() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/residents"))
        .and(query_param("id", "eq.r404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let err = store.delete_resident("r404").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn record_administration_inserts_into_history() {
    let server = MockServer::start().await;
    let entry = NewAdministrationRecord {
        medication_id: "m1".into(),
        resident_id: "r1".into(),
        administered_at: "2024-03-05T10:00:00".into(),
        administered_by_user_id: "staff7".into(),
        med_name: "Paracetamol".into(),
        dosage: "500mg".into(),
        notes: None,
    };
    let row = serde_json::json!({
        "id": "h1",
        "medication_id": "m1",
        "resident_id": "r1",
        "administered_at": "2024-03-05T10:00:00",
        "administered_by_user_id": "staff7",
        "med_name": "Paracetamol",
        "dosage": "500mg",
        "notes": null
    });
    Mock::given(method("POST"))
        .and(path("/rest/v1/medication_history"))
        .and(body_json(&entry))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([row])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let saved = store.record_administration(entry).await.expect("saved");
    assert_eq!(saved.id, "h1");
    assert_eq!(saved.administered_at, "2024-03-05T10:00:00");
}

#[tokio::test]
async fn creating_primary_contact_clears_other_primaries_first() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/family_contacts"))
        .and(query_param("resident_id", "eq.r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let created = serde_json::json!({
        "id": "c3",
        "resident_id": "r1",
        "name": "María",
        "relationship": "hija",
        "phone": null,
        "is_primary": true,
        "address": null,
        "notes": null
    });
    Mock::given(method("POST"))
        .and(path("/rest/v1/family_contacts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([created])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let contact = store
        .create_family_contact(NewFamilyContact {
            resident_id: "r1".into(),
            name: "María".into(),
            relationship: "hija".into(),
            phone: None,
            is_primary: true,
            address: None,
            notes: None,
        })
        .await
        .expect("created");
    assert!(contact.is_primary);

    // The clearing PATCH must land before the insert. Two independent writes,
    // no atomicity: that is the documented behavior.
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].method.as_str(), "PATCH");
    assert_eq!(received[1].method.as_str(), "POST");
}

#[tokio::test]
async fn non_primary_contact_skips_the_clearing_write() {
    let server = MockServer::start().await;
    let created = serde_json::json!({
        "id": "c4",
        "resident_id": "r1",
        "name": "Pedro",
        "relationship": "hijo",
        "phone": "555-0101",
        "is_primary": false,
        "address": null,
        "notes": null
    });
    Mock::given(method("POST"))
        .and(path("/rest/v1/family_contacts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([created])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store
        .create_family_contact(NewFamilyContact {
            resident_id: "r1".into(),
            name: "Pedro".into(),
            relationship: "hijo".into(),
            phone: Some("555-0101".into()),
            is_primary: false,
            address: None,
            notes: None,
        })
        .await
        .expect("created");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].method.as_str(), "POST");
}

#[tokio::test]
async fn upload_resident_photo_returns_public_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::path_regex(
            r"^/storage/v1/object/residents/resident_photo_.*\.png$",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Key": "x"})))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let png = b"\x89PNG\r\n\x1a\n0000".to_vec();
    let url = store
        .upload_resident_photo("face.png", "image/png", png)
        .await
        .expect("uploaded");
    assert!(url.starts_with(&format!("{}/storage/v1/object/public/residents/", server.uri())));
    assert!(url.ends_with(".png"));
}

#[tokio::test]
async fn upload_resident_photo_rejects_bad_payload_before_any_request() {
    let server = MockServer::start().await;
    let store = store_for(&server);

    let err = store
        .upload_resident_photo("face.txt", "text/plain", b"hello".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));

    let received = server.received_requests().await.unwrap();
    assert!(received.is_empty());
}
