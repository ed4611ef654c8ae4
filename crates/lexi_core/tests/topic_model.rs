use lexi_core::{Language, Topic, TopicRecord};

#[test]
fn topic_record_serialization_uses_expected_wire_fields() {
    let record = TopicRecord {
        id: 7,
        identifier: "checkout".to_string(),
        title: "Checkout".to_string(),
        description: "Cart and payment screens".to_string(),
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["identifier"], "checkout");
    assert_eq!(json["title"], "Checkout");
    assert_eq!(json["description"], "Cart and payment screens");

    let decoded: TopicRecord = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn topic_built_from_deserialized_record_is_clean() {
    let record: TopicRecord = serde_json::from_str(
        r#"{"id":3,"identifier":"faq","title":"FAQ","description":""}"#,
    )
    .unwrap();

    let topic = Topic::from_record(record.clone());
    assert_eq!(topic.id(), 3);
    assert!(!topic.is_new());
    assert!(!topic.has_changes());
    assert_eq!(topic.record(), record);
}

#[test]
fn language_serialization_round_trips() {
    let language = Language::new(2, "german");

    let json = serde_json::to_string(&language).unwrap();
    assert_eq!(json, r#"{"id":2,"name":"german"}"#);

    let decoded: Language = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, language);
}

#[test]
fn deserialization_rejects_missing_fields() {
    let result = serde_json::from_str::<TopicRecord>(r#"{"id":1,"identifier":"x"}"#);
    assert!(result.is_err());
}
