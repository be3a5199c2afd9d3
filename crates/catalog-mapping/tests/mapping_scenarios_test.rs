//! End-to-end mapping and matching over loaded schemas

use std::path::PathBuf;

use catalog_mapping::{
    ConvertedSchema, FieldMatcher, MatchStrategy, MatchSummary, SchemaConverter, TargetVocabulary,
    TypeMapper, match_fields,
};
use catalog_model::{Cardinality, Field, MaxOccurs};
use catalog_schema::{SchemaDocument, SchemaFormat};
use serde_json::json;

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("testdata")
        .join(name)
}

#[test]
fn test_compare_tree_and_record_schema() -> anyhow::Result<()> {
    let tree = SchemaDocument::parse(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Document" type="Doc"/>
  <xs:complexType name="Doc">
    <xs:sequence>
      <xs:element name="Shared" type="xs:string"/>
      <xs:element name="TreeOnly" type="xs:string" minOccurs="0"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#,
        SchemaFormat::Xsd,
    )?;
    let record = SchemaDocument::parse(
        r#"{"type":"record","name":"Doc","fields":[{"name":"Shared","type":"string"}]}"#,
        SchemaFormat::Avro,
    )?;

    let sources = tree.flatten();
    let targets = record.flatten();
    let report = match_fields(&sources, &targets);

    assert_eq!(
        report.summary(),
        MatchSummary {
            matched: 1,
            source_only: 1,
            target_only: 0
        }
    );
    assert_eq!(report.matches[0].strategy, MatchStrategy::ExactPath);
    assert_eq!(report.source_only[0].name, "TreeOnly");
    Ok(())
}

#[test]
fn test_compare_fixture_schemas() -> anyhow::Result<()> {
    let sources = SchemaDocument::load(testdata("pain001_sample.xsd"))?.flatten();
    let targets = SchemaDocument::load(testdata("pain001_sample.avsc"))?.flatten();

    let report = FieldMatcher::new().match_fields(&sources, &targets);
    assert_eq!(
        report.summary(),
        MatchSummary {
            matched: 15,
            source_only: 7,
            target_only: 1
        }
    );
    assert_eq!(report.count_by_strategy(MatchStrategy::ExactPath), 14);

    let by_name: Vec<_> = report
        .matches
        .iter()
        .filter(|m| m.strategy == MatchStrategy::NormalizedName)
        .collect();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].source.name, "NbOfTxs");
    assert_eq!(by_name[0].target.name, "nb_of_txs");
    assert_eq!(report.target_only[0].name, "ChrgBr");
    assert!(!report.semantic_used);
    Ok(())
}

#[test]
fn test_mandatory_unbounded_string_maps_to_plain_array() -> anyhow::Result<()> {
    let document = SchemaDocument::load(testdata("pain001_sample.xsd"))?;
    let registry = document.as_tree().expect("tree schema");
    let mapper = TypeMapper::new(registry, TargetVocabulary::Avro);

    let field = Field::new(
        "Ustrd",
        "RmtInf/Ustrd",
        "xs:string",
        Cardinality::new(1, MaxOccurs::Unbounded),
    );
    assert_eq!(
        mapper.map_field(&field),
        json!({ "type": "array", "items": "string" })
    );
    Ok(())
}

#[test]
fn test_fixture_to_avro() -> anyhow::Result<()> {
    let document = SchemaDocument::load(testdata("pain001_sample.xsd"))?;
    let registry = document.as_tree().expect("tree schema");

    let converted = SchemaConverter::new(registry)
        .with_namespace("com.bank.pain001")
        .convert(TargetVocabulary::Avro);
    let ConvertedSchema::Multiple(records) = &converted else {
        panic!("expected one record per complex type");
    };
    assert_eq!(records.len(), 7);

    let header = records
        .iter()
        .find(|r| r["name"] == "GroupHeader85")
        .expect("group header record");
    let fields = header["fields"].as_array().unwrap();
    let msg_id = fields.iter().find(|f| f["name"] == "MsgId").unwrap();
    assert_eq!(msg_id["type"], "string");
    assert_eq!(msg_id["maxLength"], 35);

    let ctrl_sum = fields.iter().find(|f| f["name"] == "CtrlSum").unwrap();
    assert_eq!(ctrl_sum["type"], json!(["null", "double"]));
    assert!(ctrl_sum["default"].is_null());

    let initiation = records
        .iter()
        .find(|r| r["name"] == "CustomerCreditTransferInitiationV09")
        .unwrap();
    let payments = initiation["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "PmtInf")
        .unwrap();
    assert_eq!(
        payments["type"],
        json!({ "type": "array", "items": "PaymentInstruction30" })
    );

    let amount = records
        .iter()
        .find(|r| r["name"] == "ActiveOrHistoricCurrencyAndAmount")
        .unwrap();
    let amount_fields = amount["fields"].as_array().unwrap();
    assert_eq!(amount_fields[0]["name"], "value");
    assert_eq!(amount_fields[0]["type"], "double");
    assert_eq!(amount_fields[1]["name"], "Ccy");
    Ok(())
}

#[test]
fn test_fixture_to_json_schema() -> anyhow::Result<()> {
    let document = SchemaDocument::load(testdata("pain001_sample.xsd"))?;
    let registry = document.as_tree().expect("tree schema");

    let schema = SchemaConverter::new(registry)
        .convert(TargetVocabulary::JsonSchema)
        .into_value();
    assert_eq!(
        schema["$id"],
        "urn:iso:std:iso:20022:tech:xsd:pain.001.001.09"
    );
    assert_eq!(
        schema["definitions"]["PaymentMethod3Code"]["enum"],
        json!(["CHK", "TRF", "TRA"])
    );
    assert_eq!(schema["definitions"]["Max35Text"]["maxLength"], 35);
    assert_eq!(
        schema["definitions"]["GroupHeader85"]["required"],
        json!(["MsgId", "CreDtTm", "NbOfTxs", "InitgPty"])
    );
    Ok(())
}
