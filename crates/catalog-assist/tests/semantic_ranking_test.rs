//! The assistant plugged into the field matcher as its semantic strategy

use catalog_assist::{AssistError, CompletionClient, SchemaAssistant};
use catalog_mapping::{FieldMatcher, MatchStrategy, MatcherConfig};
use catalog_schema::{SchemaDocument, SchemaFormat};

struct Scripted(&'static str);

impl CompletionClient for Scripted {
    fn complete(&self, _system: &str, _user: &str) -> catalog_assist::Result<String> {
        Ok(self.0.to_string())
    }
}

struct Offline;

impl CompletionClient for Offline {
    fn complete(&self, _system: &str, _user: &str) -> catalog_assist::Result<String> {
        Err(AssistError::Request("connection refused".to_string()))
    }
}

fn schemas() -> anyhow::Result<(SchemaDocument, SchemaDocument)> {
    let tree = SchemaDocument::parse(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Document" type="Doc"/>
  <xs:complexType name="Doc">
    <xs:sequence>
      <xs:element name="MsgId" type="xs:string"/>
      <xs:element name="CreDtTm" type="xs:dateTime"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#,
        SchemaFormat::Xsd,
    )?;
    let record = SchemaDocument::parse(
        r#"{"type":"record","name":"Doc","fields":[
            {"name":"message_identification","type":"string"},
            {"name":"creation_timestamp","type":"string"}
        ]}"#,
        SchemaFormat::Avro,
    )?;
    Ok((tree, record))
}

#[test]
fn test_assistant_candidates_become_semantic_matches() -> anyhow::Result<()> {
    let (tree, record) = schemas()?;
    let sources = tree.flatten();
    let targets = record.flatten();

    let assistant = SchemaAssistant::new(Scripted(
        r#"Here you go:
```json
[
  {"source_path": "MsgId", "target_path": "message_identification", "confidence": 0.95, "justification": "message id"},
  {"source_path": "CreDtTm", "target_path": "creation_timestamp", "confidence": 0.4, "justification": "weak"}
]
```"#,
    ));
    let report = FieldMatcher::new()
        .with_ranker(&assistant)
        .match_fields(&sources, &targets);

    assert!(report.semantic_used);
    assert_eq!(report.count_by_strategy(MatchStrategy::Semantic), 1);
    let matched = report.match_for_source(0).expect("MsgId matched");
    assert_eq!(matched.target.name, "message_identification");
    assert_eq!(matched.justification, "message id");

    // Below the confidence threshold
    assert_eq!(report.source_only.len(), 1);
    assert_eq!(report.source_only[0].name, "CreDtTm");
    Ok(())
}

#[test]
fn test_unreachable_assistant_degrades_to_structural_matching() -> anyhow::Result<()> {
    let (tree, record) = schemas()?;
    let sources = tree.flatten();
    let targets = record.flatten();

    let assistant = SchemaAssistant::new(Offline);
    let report = FieldMatcher::new()
        .with_config(MatcherConfig {
            batch_size: 1,
            ..Default::default()
        })
        .with_ranker(&assistant)
        .match_fields(&sources, &targets);

    assert!(report.matches.is_empty());
    assert_eq!(report.semantic_failures, 2);
    assert_eq!(report.source_only.len(), 2);
    assert_eq!(report.target_only.len(), 2);
    Ok(())
}
