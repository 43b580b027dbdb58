use crate::config::Rule;

pub const UNKNOWN_MANUFACTURER: &str = "Unknown";

// インストールパスに現れるメーカー由来のディレクトリ断片（小文字、前方が優先）。
const PATH_RULES: &[(&str, &str)] = &[
    ("spitfire audio", "Spitfire Audio"),
    ("native instruments", "Native Instruments"),
    ("izotope", "iZotope"),
    ("fabfilter", "FabFilter"),
    ("soundtoys", "Soundtoys"),
    ("xfer records", "Xfer Records"),
    ("valhalla", "Valhalla DSP"),
    ("arturia", "Arturia"),
    ("u-he", "u-he"),
    ("eventide", "Eventide"),
    ("waves", "Waves"),
    ("tal-software", "TAL-Software"),
    ("xln audio", "XLN Audio"),
    ("plugin alliance", "Plugin Alliance"),
    ("cherry audio", "Cherry Audio"),
    ("mastering the mix", "Mastering the Mix"),
    ("cableguys", "Cable Guys"),
    ("2getheraudio", "2getheraudio"),
];

// プラグイン名に現れる製品系列の断片（小文字、前方が優先）。
const NAME_RULES: &[(&str, &str)] = &[
    ("tal-", "TAL-Software"),
    ("labs", "Spitfire Audio"),
    ("ozone", "iZotope"),
    ("neutron", "iZotope"),
    ("levels", "Mastering the Mix"),
    ("rc-20", "XLN Audio"),
    ("halftime", "Cable Guys"),
    ("blackhole", "Eventide"),
    ("decapitator", "Soundtoys"),
    ("waveshell", "Waves"),
    ("serum", "Xfer Records"),
    ("valhalla", "Valhalla DSP"),
    ("kontakt", "Native Instruments"),
    ("massive", "Native Instruments"),
    ("sylenth", "LennarDigital"),
    ("2getheraudio", "2getheraudio"),
    ("cherry", "Cherry Audio"),
];

#[derive(Debug, Clone)]
pub struct Classifier {
    path_rules: Vec<(String, String)>,
    name_rules: Vec<(String, String)>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&[], &[])
    }
}

impl Classifier {
    // 設定ファイル由来のルールを組み込みの前に並べる（先勝ち）。
    pub fn new(extra_path_rules: &[Rule], extra_name_rules: &[Rule]) -> Self {
        let path_rules = extra_path_rules
            .iter()
            .map(|rule| (rule.pattern.to_lowercase(), rule.label.clone()))
            .chain(
                PATH_RULES
                    .iter()
                    .map(|(pattern, label)| (pattern.to_string(), label.to_string())),
            )
            .collect();
        let name_rules = extra_name_rules
            .iter()
            .map(|rule| (rule.pattern.to_lowercase(), rule.label.clone()))
            .chain(
                NAME_RULES
                    .iter()
                    .map(|(pattern, label)| (pattern.to_string(), label.to_string())),
            )
            .collect();

        Self {
            path_rules,
            name_rules,
        }
    }

    // 全域関数: パスルール → 名前ルール → "Unknown" の順で必ずラベルを返す。
    pub fn classify(&self, name: &str, path: Option<&str>) -> String {
        if let Some(path) = path {
            let haystack = path.to_lowercase();
            for (pattern, label) in &self.path_rules {
                if haystack.contains(pattern) {
                    return label.clone();
                }
            }
        }

        let haystack = name.to_lowercase();
        for (pattern, label) in &self.name_rules {
            if haystack.contains(pattern) {
                return label.clone();
            }
        }

        UNKNOWN_MANUFACTURER.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, label: &str) -> Rule {
        Rule {
            pattern: pattern.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn path_rules_take_precedence_over_name_rules() {
        let classifier = Classifier::default();
        // 名前は "ozone" (iZotope) にも一致するが、パスが先に判定される。
        let label = classifier.classify(
            "Ozone 9.dll",
            Some(r"C:\Program Files\VSTPlugins\FabFilter\Ozone 9.dll"),
        );
        assert_eq!(label, "FabFilter");
    }

    #[test]
    fn name_rule_applies_when_path_is_absent() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("LABS (64 Bit).dll", None),
            "Spitfire Audio"
        );
        assert_eq!(classifier.classify("TAL-Reverb-4", None), "TAL-Software");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("SERUM X64", None),
            "Xfer Records"
        );
        assert_eq!(
            classifier.classify("thing.dll", Some("D:/VST/SPITFIRE AUDIO/thing.dll")),
            "Spitfire Audio"
        );
    }

    #[test]
    fn unmatched_input_falls_back_to_unknown() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("Unknown Widget.dll", None),
            UNKNOWN_MANUFACTURER
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = Classifier::default();
        let first = classifier.classify("Serum", Some("D:/VST/Xfer Records/Serum.dll"));
        for _ in 0..3 {
            assert_eq!(
                classifier.classify("Serum", Some("D:/VST/Xfer Records/Serum.dll")),
                first
            );
        }
    }

    #[test]
    fn config_rules_are_consulted_before_builtin_rules() {
        let classifier = Classifier::new(
            &[rule("MyVendor", "My Vendor")],
            &[rule("labs", "Somebody Else")],
        );
        assert_eq!(
            classifier.classify("x.dll", Some("C:/VST/MyVendor/x.dll")),
            "My Vendor"
        );
        // 組み込みの labs → Spitfire Audio より設定側が先に一致する。
        assert_eq!(classifier.classify("LABS", None), "Somebody Else");
    }

    #[test]
    fn first_match_wins_within_a_table() {
        let classifier = Classifier::new(
            &[],
            &[rule("tal-reverb", "First"), rule("tal-", "Second")],
        );
        assert_eq!(classifier.classify("TAL-Reverb-4", None), "First");
    }
}
