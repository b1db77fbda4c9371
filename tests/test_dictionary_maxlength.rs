#[cfg(test)]
mod tests {
    use opencc_fmmseg::dictionary_lib::{DictMaxLen, DictionaryMaxlength};
    use std::fs;
    use std::path::Path;

    type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

    /// Fixed order view over the sixteen `DictMaxLen` tables.
    fn all_dicts(d: &DictionaryMaxlength) -> [&DictMaxLen; 16] {
        [
            &d.st_characters,
            &d.st_phrases,
            &d.ts_characters,
            &d.ts_phrases,
            &d.tw_phrases,
            &d.tw_phrases_rev,
            &d.tw_variants,
            &d.tw_variants_rev,
            &d.tw_variants_rev_phrases,
            &d.hk_variants,
            &d.hk_variants_rev,
            &d.hk_variants_rev_phrases,
            &d.jps_characters,
            &d.jps_phrases,
            &d.jp_variants,
            &d.jp_variants_rev,
        ]
    }

    const DICT_FILES: &[&str] = &[
        "STCharacters.txt",
        "STPhrases.txt",
        "TSCharacters.txt",
        "TSPhrases.txt",
        "TWPhrases.txt",
        "TWPhrasesRev.txt",
        "TWVariants.txt",
        "TWVariantsRev.txt",
        "TWVariantsRevPhrases.txt",
        "HKVariants.txt",
        "HKVariantsRev.txt",
        "HKVariantsRevPhrases.txt",
        "JPShinjitaiCharacters.txt",
        "JPShinjitaiPhrases.txt",
        "JPVariants.txt",
        "JPVariantsRev.txt",
    ];

    /// Writes one populated dictionary file and fifteen empty stubs under `dir`,
    /// so `DictionaryMaxlength::from_dicts` has a complete slot set to read.
    fn write_fixture_dir(dir: &Path, populated: &[&str]) -> TestResult<()> {
        for &name in DICT_FILES {
            let contents = if populated.contains(&name) {
                "汉\t漢\n字\t字\n"
            } else {
                ""
            };
            fs::write(dir.join(name), contents)?;
        }
        Ok(())
    }

    fn check_invariants(d: &DictionaryMaxlength) {
        for (i, dm) in all_dicts(d).iter().enumerate() {
            assert!(
                dm.min_len <= dm.max_len || dm.map.is_empty(),
                "Dict[{i}]: min_len {} > max_len {}",
                dm.min_len,
                dm.max_len
            );
            if dm.key_length_mask != 0 {
                if (1..=64).contains(&dm.min_len) {
                    assert!(
                        dm.has_key_len(dm.min_len),
                        "Dict[{i}]: mask missing min_len {}",
                        dm.min_len
                    );
                }
                if (1..=64).contains(&dm.max_len) {
                    assert!(
                        dm.has_key_len(dm.max_len),
                        "Dict[{i}]: mask missing max_len {}",
                        dm.max_len
                    );
                }
            }
        }
    }

    #[test]
    fn from_dicts_loads_all_sixteen_slots() -> TestResult<()> {
        let dir = tempfile::tempdir()?;
        write_fixture_dir(dir.path(), &["STCharacters.txt"])?;

        let dicts = DictionaryMaxlength::from_dicts(dir.path().to_str().unwrap())?;
        check_invariants(&dicts);

        let all = all_dicts(&dicts);
        assert_eq!(all.len(), 16);
        let non_empty = all.iter().filter(|d| !d.map.is_empty()).count();
        assert_eq!(non_empty, 1);
        assert_eq!(dicts.st_characters.map.len(), 2);

        Ok(())
    }

    #[test]
    fn roundtrip_compressed_file_preserves_all_slots() -> TestResult<()> {
        let dir = tempfile::tempdir()?;
        write_fixture_dir(
            dir.path(),
            &["STCharacters.txt", "STPhrases.txt", "TWVariants.txt"],
        )?;

        let original = DictionaryMaxlength::from_dicts(dir.path().to_str().unwrap())?;

        let archive = dir.path().join("bundle.zstd");
        DictionaryMaxlength::save_compressed(&original, archive.to_str().unwrap())?;
        let restored = DictionaryMaxlength::load_compressed(archive.to_str().unwrap())?;

        check_invariants(&restored);

        let before: Vec<_> = all_dicts(&original).iter().map(|d| d.map.len()).collect();
        let after: Vec<_> = all_dicts(&restored).iter().map(|d| d.map.len()).collect();
        assert_eq!(before, after, "per-slot pair counts mismatch after round-trip");

        Ok(())
    }
}
