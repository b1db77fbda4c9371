use opencc_fmmseg::OpenCC;
use std::fs;
use std::path::Path;

const DICT_FILES: &[(&str, &str)] = &[
    ("STCharacters.txt", "汉\t漢\n字\t字\n"),
    ("STPhrases.txt", "龙马精神\t龍馬精神\n"),
    ("TSCharacters.txt", "漢\t汉\n龍\t龙\n馬\t马\n精\t精\n神\t神\n"),
    ("TSPhrases.txt", "龍馬精神\t龙马精神\n"),
    ("TWPhrases.txt", "意大利\t義大利\n"),
    ("TWPhrasesRev.txt", "義大利\t意大利\n"),
    ("TWVariants.txt", ""),
    ("TWVariantsRev.txt", ""),
    ("TWVariantsRevPhrases.txt", ""),
    ("HKVariants.txt", ""),
    ("HKVariantsRev.txt", ""),
    ("HKVariantsRevPhrases.txt", ""),
    (
        "JPShinjitaiCharacters.txt",
        "旧\t舊\n広\t廣\n国\t國\n読\t讀\n売\t賣\n字\t字\n体\t體\n",
    ),
    ("JPShinjitaiPhrases.txt", ""),
    (
        "JPVariants.txt",
        "舊\t旧\n廣\t広\n國\t国\n讀\t読\n賣\t売\n字\t字\n體\t体\n",
    ),
    (
        "JPVariantsRev.txt",
        "旧\t舊\n広\t廣\n国\t國\n読\t讀\n売\t賣\n体\t體\n",
    ),
];

fn write_fixture_dir(dir: &Path) {
    for &(name, contents) in DICT_FILES {
        fs::write(dir.join(name), contents).unwrap();
    }
}

fn converter(config: &str) -> OpenCC {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_dir(dir.path());
    OpenCC::from_dicts(dir.path().to_str().unwrap(), Some(config))
}

#[test]
fn zho_check_detects_simplified_and_traditional() {
    let cc = converter("s2t");
    // "汉字" contains only `st_characters` keys: changes under `st`, not `ts`.
    assert_eq!(cc.zho_check("汉字"), 2);
    // "龍馬精神" contains only `ts_characters` keys: changes under `ts`, not `st`.
    assert_eq!(cc.zho_check("龍馬精神"), 1);
    assert_eq!(cc.zho_check("hello, world"), 0);
    assert_eq!(cc.zho_check(""), 0);
}

#[test]
fn s2t_converts_simplified_phrase_and_character() {
    let cc = converter("s2t");
    assert_eq!(cc.convert("龙马精神，汉字", false), "龍馬精神，漢字");
}

#[test]
fn t2s_converts_traditional_phrase_and_character() {
    let cc = converter("t2s");
    assert_eq!(cc.convert("龍馬精神，漢字", false), "龙马精神，汉字");
}

#[test]
fn t2twp_applies_taiwan_phrase_round() {
    let cc = converter("t2twp");
    assert_eq!(cc.convert("意大利", false), "義大利");
}

#[test]
fn tw2tp_applies_taiwan_reverse_phrase_round() {
    let cc = converter("tw2tp");
    assert_eq!(cc.convert("義大利", false), "意大利");
}

#[test]
fn t2jp_converts_kyujitai_to_shinjitai() {
    let cc = converter("t2jp");
    assert_eq!(cc.convert("舊字體：廣國，讀賣。", false), "旧字体：広国，読売。");
}

#[test]
fn jp2t_converts_shinjitai_to_kyujitai() {
    let cc = converter("jp2t");
    assert_eq!(cc.convert("広国，読売。", false), "廣國，讀賣。");
}

#[test]
fn punctuation_post_step_applies_for_s_style_configs() {
    let cc = converter("s2t");
    assert_eq!(
        cc.convert("你好，世界！\u{201C}龙马精神\u{201D}！", true),
        "你好，世界！「龍馬精神」！"
    );
}

#[test]
fn punctuation_post_step_is_skipped_for_japanese_configs() {
    let cc = converter("t2jp");
    assert_eq!(
        cc.convert("\u{201C}舊字體\u{201D}", true),
        "\u{201C}旧字体\u{201D}"
    );
}

#[test]
fn empty_input_yields_empty_output() {
    let cc = converter("s2t");
    assert_eq!(cc.convert("", false), "");
}

#[test]
fn config_round_trip_via_accessors() {
    let mut cc = converter("s2t");
    assert_eq!(cc.get_config(), "s2t");
    cc.set_config("t2s");
    assert_eq!(cc.get_config(), "t2s");
}

#[test]
fn supported_configs_lists_all_sixteen_tags() {
    assert_eq!(OpenCC::supported_configs().len(), 16);
    assert!(OpenCC::supported_configs().contains(&"s2twp"));
}

#[test]
fn unchanged_text_passes_through_without_dictionary_hits() {
    let cc = converter("s2t");
    assert_eq!(cc.convert("hello world 123", false), "hello world 123");
}

#[test]
fn oversized_phrase_key_falls_back_to_legacy_scanner() {
    // A dictionary entry longer than the 64-scalar starter-index cap pushes this
    // round's `max_word_length` past 64, which should route it through the legacy
    // scanner (`convert_by`) instead of the indexed one. The long entry must still
    // match, and `get_last_error` must record the fallback.
    let long_key: String = std::iter::repeat('汉').take(65).collect();
    let long_value: String = std::iter::repeat('漢').take(65).collect();

    let dir = tempfile::tempdir().unwrap();
    write_fixture_dir(dir.path());
    let extra = format!("{}\t{}\n", long_key, long_value);
    let mut contents = fs::read_to_string(dir.path().join("STPhrases.txt")).unwrap();
    contents.push_str(&extra);
    fs::write(dir.path().join("STPhrases.txt"), contents).unwrap();

    let cc = OpenCC::from_dicts(dir.path().to_str().unwrap(), Some("s2t"));
    let input = format!("{}字", long_key);
    let expected = format!("{}字", long_value);
    assert_eq!(cc.convert(&input, false), expected);
    assert!(OpenCC::get_last_error().unwrap().contains("64"));
}

#[test]
fn astral_plane_starter_is_matched() {
    // U+20000 is outside the BMP, exercising `StarterUnion`'s sparse astral maps
    // rather than the dense `bmp_mask`/`bmp_cap` arrays.
    let astral = '\u{20000}';
    let dir = tempfile::tempdir().unwrap();
    write_fixture_dir(dir.path());
    let key = format!("{}字", astral);
    fs::write(dir.path().join("STCharacters.txt"), format!("{}\t漢字\n", key)).unwrap();

    let cc = OpenCC::from_dicts(dir.path().to_str().unwrap(), Some("s2t"));
    assert_eq!(cc.convert(&key, false), "漢字");
}

#[test]
fn from_json_round_trip_builds_a_working_converter() {
    use opencc_fmmseg::dictionary_lib::DictionaryMaxlength;

    let dir = tempfile::tempdir().unwrap();
    write_fixture_dir(dir.path());
    let dicts = DictionaryMaxlength::from_dicts(dir.path().to_str().unwrap()).unwrap();

    let json_path = dir.path().join("bundle.json");
    dicts.save_json(&json_path).unwrap();

    let cc = OpenCC::from_json(json_path.to_str().unwrap(), Some("s2t"));
    assert_eq!(cc.convert("龙马精神，汉字", false), "龍馬精神，漢字");
}
