use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::{FileFailure, PluginReference};

// Ableton のデバイスノード。これ 1 要素が 1 つのプラグイン参照に対応する。
const PLUGIN_INFO_TAGS: &[&[u8]] = &[b"VstPluginInfo", b"Vst3PluginInfo", b"AuPluginInfo"];

#[derive(Debug, Default)]
struct PendingNode {
    tag: Vec<u8>,
    // 情報ノード内の入れ子の深さ。直下の子要素（深さ 0）だけが値を供給する。
    depth: usize,
    display_name: Option<String>,
    file_name: Option<String>,
    path: Option<String>,
}

// 展開済み XML からプラグイン参照を文書順で収集する。重複もそのまま返す。
// 名前もパスも持たないノードは読み飛ばし、文書自体が壊れている場合のみ失敗する。
pub fn plugin_references(xml: &[u8]) -> Result<Vec<PluginReference>, FileFailure> {
    let mut reader = Reader::from_reader(xml);
    let mut references = Vec::new();
    let mut stack: Vec<PendingNode> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if is_plugin_info_tag(e.name().as_ref()) {
                    stack.push(PendingNode {
                        tag: e.name().as_ref().to_vec(),
                        ..PendingNode::default()
                    });
                } else if let Some(node) = stack.last_mut() {
                    if node.depth == 0 {
                        capture_child(node, &e);
                    }
                    node.depth += 1;
                }
            }
            Ok(Event::Empty(e)) => {
                if is_plugin_info_tag(e.name().as_ref()) {
                    let mut node = PendingNode {
                        tag: e.name().as_ref().to_vec(),
                        ..PendingNode::default()
                    };
                    if let Some(name) = attr_value(&e, b"Name") {
                        node.display_name = Some(name);
                    }
                    if let Some(reference) = resolve(node) {
                        references.push(reference);
                    }
                } else if let Some(node) = stack.last_mut() {
                    if node.depth == 0 {
                        capture_child(node, &e);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let closes_pending = match stack.last_mut() {
                    Some(node) if node.depth > 0 => {
                        node.depth -= 1;
                        false
                    }
                    Some(node) => node.tag == e.name().as_ref(),
                    None => false,
                };
                if closes_pending {
                    let node = stack.pop().unwrap_or_default();
                    if let Some(reference) = resolve(node) {
                        references.push(reference);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(FileFailure::format(format!(
                    "XML の解析に失敗しました: {err}"
                )));
            }
        }
    }

    Ok(references)
}

fn is_plugin_info_tag(name: &[u8]) -> bool {
    PLUGIN_INFO_TAGS.contains(&name)
}

fn capture_child(node: &mut PendingNode, e: &BytesStart) {
    match e.name().as_ref() {
        b"PlugName" | b"Name" => {
            if node.display_name.is_none() {
                if let Some(value) = attr_value(e, b"Value") {
                    node.display_name = Some(value);
                }
            }
        }
        b"FileName" => {
            if node.file_name.is_none() {
                if let Some(value) = attr_value(e, b"Value") {
                    node.file_name = Some(value);
                }
            }
        }
        b"Path" => {
            if node.path.is_none() {
                if let Some(value) = attr_value(e, b"Value") {
                    node.path = Some(value);
                }
            }
        }
        _ => {}
    }
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            let value = attr.unescape_value().ok()?;
            let value = value.trim();
            if value.is_empty() {
                return None;
            }
            return Some(value.to_string());
        }
    }
    None
}

// 表示名の決定: バイナリへのパスがあればその基底名（元ツールは dll 名をキーにする）、
// なければ FileName、最後に PlugName/Name。
fn resolve(node: PendingNode) -> Option<PluginReference> {
    let PendingNode {
        display_name,
        file_name,
        path,
        ..
    } = node;

    let name = path
        .as_deref()
        .map(base_name)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or(file_name)
        .or(display_name)?;

    Some(PluginReference { name, path })
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_reference_elements_yield_three_entries_in_document_order() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<Ableton>
  <PluginDesc>
    <VstPluginInfo>
      <FileName Value="LABS (64 Bit)"/>
      <Path Value="C:\VST\Spitfire Audio\LABS (64 Bit).dll"/>
    </VstPluginInfo>
  </PluginDesc>
  <PluginDesc>
    <Vst3PluginInfo>
      <Name Value="Serum"/>
    </Vst3PluginInfo>
  </PluginDesc>
  <PluginDesc>
    <VstPluginInfo>
      <FileName Value="TAL-Reverb-4"/>
    </VstPluginInfo>
  </PluginDesc>
</Ableton>"#;

        let refs = plugin_references(xml).expect("extract");
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].name, "LABS (64 Bit).dll");
        assert_eq!(
            refs[0].path.as_deref(),
            Some(r"C:\VST\Spitfire Audio\LABS (64 Bit).dll")
        );
        assert_eq!(refs[1].name, "Serum");
        assert_eq!(refs[1].path, None);
        assert_eq!(refs[2].name, "TAL-Reverb-4");
    }

    #[test]
    fn duplicate_references_are_preserved() {
        let xml = br#"<Ableton>
  <VstPluginInfo><Path Value="D:/VST/Serum.dll"/></VstPluginInfo>
  <VstPluginInfo><Path Value="D:/VST/Serum.dll"/></VstPluginInfo>
</Ableton>"#;

        let refs = plugin_references(xml).expect("extract");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "Serum.dll");
        assert_eq!(refs[1].name, "Serum.dll");
    }

    #[test]
    fn node_without_name_or_path_is_skipped() {
        let xml = br#"<Ableton>
  <VstPluginInfo><Preset Value="init"/></VstPluginInfo>
  <Vst3PluginInfo><Name Value="Pigments"/></Vst3PluginInfo>
</Ableton>"#;

        let refs = plugin_references(xml).expect("extract");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "Pigments");
    }

    #[test]
    fn empty_info_element_uses_its_name_attribute() {
        let xml = br#"<Ableton><Vst3PluginInfo Name="Diva"/></Ableton>"#;
        let refs = plugin_references(xml).expect("extract");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "Diva");
    }

    #[test]
    fn grandchild_values_do_not_shadow_direct_children() {
        let xml = br#"<Ableton>
  <Vst3PluginInfo>
    <Preset><Name Value="Init Patch"/><Path Value="Presets/Init.vstpreset"/></Preset>
    <Name Value="Pigments"/>
  </Vst3PluginInfo>
</Ableton>"#;

        let refs = plugin_references(xml).expect("extract");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "Pigments");
        assert_eq!(refs[0].path, None);
    }

    #[test]
    fn unrecognized_structure_yields_zero_references() {
        let xml = br#"<Ableton><LiveSet><Tracks/></LiveSet></Ableton>"#;
        let refs = plugin_references(xml).expect("extract");
        assert!(refs.is_empty());
    }

    #[test]
    fn mismatched_end_tag_is_a_format_failure() {
        let xml = br#"<Ableton><VstPluginInfo></Oops></Ableton>"#;
        let err = plugin_references(xml).expect_err("must fail");
        assert_eq!(err.kind, crate::core::FailureKind::Format);
    }

    #[test]
    fn escaped_attribute_values_are_unescaped() {
        let xml = br#"<Ableton>
  <VstPluginInfo><Path Value="C:\VST\R&amp;B Tools\Chops.dll"/></VstPluginInfo>
</Ableton>"#;
        let refs = plugin_references(xml).expect("extract");
        assert_eq!(refs[0].name, "Chops.dll");
        assert_eq!(refs[0].path.as_deref(), Some(r"C:\VST\R&B Tools\Chops.dll"));
    }
}
