//! Curated recommendation catalog
//!
//! Static, read-only data keyed by canonical subject label. Used to
//! translate labels into display names and as the fallback whenever the
//! generation backend cannot produce a usable recommendation.

use crate::model::{Locale, Nutrition, Recommendation, UNKNOWN_SUBJECT};

/// Catalog text in one language
#[derive(Debug)]
pub struct CatalogText {
    /// Display name of the subject
    pub name: &'static str,
    pub recipes: [&'static str; 3],
    pub calories: &'static str,
    pub vitamins: &'static [&'static str],
    pub benefits: &'static [&'static str],
    pub storage_tips: &'static str,
}

/// A curated catalog entry
#[derive(Debug)]
pub struct CatalogEntry {
    /// Canonical subject label as reported by the classifier
    pub label: &'static str,
    pub id: CatalogText,
    pub en: CatalogText,
}

impl CatalogEntry {
    pub fn text(&self, locale: Locale) -> &CatalogText {
        match locale {
            Locale::Indonesian => &self.id,
            Locale::English => &self.en,
        }
    }

    pub fn display_name(&self, locale: Locale) -> &'static str {
        self.text(locale).name
    }

    /// The curated recommendation for this entry in the given language
    pub fn recommendation(&self, locale: Locale) -> Recommendation {
        let text = self.text(locale);
        Recommendation {
            recipes: text.recipes.iter().map(|r| r.to_string()).collect(),
            nutrition: Nutrition::Detailed {
                calories: Some(text.calories.to_string()),
                vitamins: Some(text.vitamins.iter().map(|v| v.to_string()).collect()),
                benefits: Some(text.benefits.iter().map(|b| b.to_string()).collect()),
            },
            storage_tips: text.storage_tips.to_string(),
        }
    }
}

/// A classified subject with its translated name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    /// Canonical label
    pub label: String,
    /// Name in the target language
    pub display_name: String,
}

impl Subject {
    /// Resolve the display name for a label via the catalog
    pub fn resolve(label: &str, locale: Locale) -> Self {
        let display_name = match lookup(label) {
            Some(entry) => entry.display_name(locale).to_string(),
            None => label.replace('_', " "),
        };

        Self {
            label: label.to_string(),
            display_name,
        }
    }

    /// Canonical label written the way it would appear in prose
    pub fn label_as_text(&self) -> String {
        self.label.replace('_', " ")
    }

    /// Whether generated text must avoid the canonical label
    ///
    /// False when the translated name already contains the label, as with
    /// most English names.
    pub fn forbids_source_label(&self) -> bool {
        let display = self.display_name.to_lowercase();
        !display.contains(&self.label_as_text().to_lowercase())
    }
}

/// Find the catalog entry for a label
///
/// Matching ignores case and treats spaces and underscores alike.
pub fn lookup(label: &str) -> Option<&'static CatalogEntry> {
    let wanted = normalize_label(label);
    CATALOG
        .iter()
        .find(|entry| normalize_label(entry.label) == wanted)
}

/// All canonical labels known to the catalog
pub fn labels() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|entry| entry.label)
}

/// The generic recommendation used when no catalog entry applies
pub fn degraded_fallback(locale: Locale) -> Recommendation {
    let (recipe, info, storage) = match locale {
        Locale::Indonesian => (
            "Rekomendasi saat ini tidak tersedia",
            "Informasi nutrisi saat ini tidak tersedia",
            "Simpan sayuran di tempat sejuk dan kering, lalu olah selagi masih segar.",
        ),
        Locale::English => (
            "Recommendation currently unavailable",
            "Nutrition information currently unavailable",
            "Keep vegetables in a cool, dry place and cook them while fresh.",
        ),
    };

    Recommendation {
        recipes: vec![recipe.to_string()],
        nutrition: Nutrition::Summary {
            info: info.to_string(),
        },
        storage_tips: storage.to_string(),
    }
}

/// Catalog recommendation for a label, or the degraded fallback
pub fn fallback_for(label: &str, locale: Locale) -> Recommendation {
    if label == UNKNOWN_SUBJECT {
        return degraded_fallback(locale);
    }

    match lookup(label) {
        Some(entry) => entry.recommendation(locale),
        None => degraded_fallback(locale),
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().replace(' ', "_").to_lowercase()
}

static CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        label: "Bean",
        id: CatalogText {
            name: "Buncis",
            recipes: [
                "Tumis Buncis Bawang Putih",
                "Buncis Tahu Saus Tiram",
                "Sayur Sop Buncis",
            ],
            calories: "31 kkal per 100 gram",
            vitamins: &["Vitamin C", "Vitamin K", "Folat"],
            benefits: &[
                "Menjaga kesehatan tulang",
                "Membantu pencernaan berkat kandungan serat",
            ],
            storage_tips: "Simpan buncis kering dalam kantong berlubang di lemari es dan gunakan dalam 5 hari.",
        },
        en: CatalogText {
            name: "Green Bean",
            recipes: [
                "Garlic Stir-Fried Green Beans",
                "Green Beans with Tofu in Oyster Sauce",
                "Green Bean Vegetable Soup",
            ],
            calories: "31 kcal per 100 grams",
            vitamins: &["Vitamin C", "Vitamin K", "Folate"],
            benefits: &[
                "Supports bone health",
                "Aids digestion thanks to its fiber",
            ],
            storage_tips: "Keep dry green beans in a perforated bag in the fridge and use them within 5 days.",
        },
    },
    CatalogEntry {
        label: "Bitter_Gourd",
        id: CatalogText {
            name: "Pare",
            recipes: [
                "Tumis Pare Telur",
                "Pare Isi Ayam Kukus",
                "Oseng Pare Teri",
            ],
            calories: "17 kkal per 100 gram",
            vitamins: &["Vitamin C", "Vitamin A", "Folat"],
            benefits: &[
                "Membantu mengontrol kadar gula darah",
                "Mendukung daya tahan tubuh",
            ],
            storage_tips: "Bungkus pare dengan kertas tisu lalu simpan di laci sayur lemari es, tahan 4 sampai 5 hari.",
        },
        en: CatalogText {
            name: "Bitter Gourd",
            recipes: [
                "Bitter Gourd Stir-Fried with Egg",
                "Steamed Chicken-Stuffed Bitter Gourd",
                "Bitter Gourd with Dried Anchovies",
            ],
            calories: "17 kcal per 100 grams",
            vitamins: &["Vitamin C", "Vitamin A", "Folate"],
            benefits: &[
                "Helps control blood sugar",
                "Supports the immune system",
            ],
            storage_tips: "Wrap bitter gourd in paper towels and keep it in the crisper drawer for 4 to 5 days.",
        },
    },
    CatalogEntry {
        label: "Bottle_Gourd",
        id: CatalogText {
            name: "Labu Air",
            recipes: [
                "Sayur Bening Labu Air",
                "Tumis Labu Air Udang",
                "Sup Labu Air Bakso",
            ],
            calories: "14 kkal per 100 gram",
            vitamins: &["Vitamin C", "Vitamin B1", "Kalium"],
            benefits: &[
                "Menjaga hidrasi tubuh",
                "Rendah kalori sehingga cocok untuk diet",
            ],
            storage_tips: "Simpan labu air utuh di suhu ruang yang sejuk; setelah dipotong, tutup rapat dan simpan di lemari es.",
        },
        en: CatalogText {
            name: "Bottle Gourd",
            recipes: [
                "Clear Bottle Gourd Soup",
                "Bottle Gourd Stir-Fried with Shrimp",
                "Bottle Gourd and Meatball Soup",
            ],
            calories: "14 kcal per 100 grams",
            vitamins: &["Vitamin C", "Vitamin B1", "Potassium"],
            benefits: &[
                "Keeps the body hydrated",
                "Low in calories and diet friendly",
            ],
            storage_tips: "Keep a whole bottle gourd in a cool room; once cut, cover it tightly and refrigerate.",
        },
    },
    CatalogEntry {
        label: "Brinjal",
        id: CatalogText {
            name: "Terong",
            recipes: [
                "Terong Balado",
                "Terong Goreng Tepung",
                "Sambal Terong Penyet",
            ],
            calories: "25 kkal per 100 gram",
            vitamins: &["Vitamin B6", "Vitamin K", "Kalium"],
            benefits: &[
                "Mengandung antioksidan nasunin",
                "Mendukung kesehatan jantung",
            ],
            storage_tips: "Simpan terong di tempat sejuk tanpa dicuci dan olah dalam 3 sampai 4 hari.",
        },
        en: CatalogText {
            name: "Eggplant",
            recipes: [
                "Eggplant Balado",
                "Battered Fried Eggplant",
                "Smashed Eggplant with Sambal",
            ],
            calories: "25 kcal per 100 grams",
            vitamins: &["Vitamin B6", "Vitamin K", "Potassium"],
            benefits: &[
                "Contains the antioxidant nasunin",
                "Supports heart health",
            ],
            storage_tips: "Store eggplant unwashed in a cool place and cook it within 3 to 4 days.",
        },
    },
    CatalogEntry {
        label: "Broccoli",
        id: CatalogText {
            name: "Brokoli",
            recipes: [
                "Tumis Brokoli Bawang Putih",
                "Cah Brokoli Jamur",
                "Sup Krim Brokoli",
            ],
            calories: "34 kkal per 100 gram",
            vitamins: &["Vitamin C", "Vitamin K", "Vitamin A"],
            benefits: &[
                "Meningkatkan daya tahan tubuh",
                "Kaya serat untuk pencernaan",
            ],
            storage_tips: "Bungkus brokoli dengan kertas tisu lembap dan simpan di lemari es hingga 5 hari.",
        },
        en: CatalogText {
            name: "Broccoli",
            recipes: [
                "Garlic Stir-Fried Broccoli",
                "Broccoli and Mushroom Stir-Fry",
                "Cream of Broccoli Soup",
            ],
            calories: "34 kcal per 100 grams",
            vitamins: &["Vitamin C", "Vitamin K", "Vitamin A"],
            benefits: &[
                "Boosts the immune system",
                "Rich in fiber for digestion",
            ],
            storage_tips: "Wrap broccoli in a damp paper towel and refrigerate for up to 5 days.",
        },
    },
    CatalogEntry {
        label: "Cabbage",
        id: CatalogText {
            name: "Kubis",
            recipes: [
                "Kol Goreng Bawang",
                "Tumis Kubis Telur",
                "Sayur Lodeh Kubis",
            ],
            calories: "25 kkal per 100 gram",
            vitamins: &["Vitamin C", "Vitamin K", "Vitamin B6"],
            benefits: &[
                "Membantu melancarkan pencernaan",
                "Mengandung antioksidan antiradang",
            ],
            storage_tips: "Simpan kubis utuh di laci sayur lemari es; bungkus rapat bagian yang sudah dipotong.",
        },
        en: CatalogText {
            name: "Cabbage",
            recipes: [
                "Fried Cabbage with Shallots",
                "Cabbage Stir-Fried with Egg",
                "Cabbage in Coconut Milk Curry",
            ],
            calories: "25 kcal per 100 grams",
            vitamins: &["Vitamin C", "Vitamin K", "Vitamin B6"],
            benefits: &[
                "Helps keep digestion regular",
                "Contains anti-inflammatory antioxidants",
            ],
            storage_tips: "Keep whole cabbage in the crisper drawer; wrap any cut portion tightly.",
        },
    },
    CatalogEntry {
        label: "Capsicum",
        id: CatalogText {
            name: "Paprika",
            recipes: [
                "Tumis Paprika Daging Sapi",
                "Paprika Isi Nasi Panggang",
                "Ayam Saus Paprika",
            ],
            calories: "31 kkal per 100 gram",
            vitamins: &["Vitamin C", "Vitamin A", "Vitamin B6"],
            benefits: &[
                "Menjaga kesehatan mata",
                "Meningkatkan penyerapan zat besi",
            ],
            storage_tips: "Simpan paprika kering dalam wadah tertutup di lemari es hingga satu minggu.",
        },
        en: CatalogText {
            name: "Bell Pepper",
            recipes: [
                "Beef and Bell Pepper Stir-Fry",
                "Baked Rice-Stuffed Bell Peppers",
                "Chicken in Bell Pepper Sauce",
            ],
            calories: "31 kcal per 100 grams",
            vitamins: &["Vitamin C", "Vitamin A", "Vitamin B6"],
            benefits: &[
                "Supports eye health",
                "Improves iron absorption",
            ],
            storage_tips: "Keep bell peppers dry in a closed container in the fridge for up to a week.",
        },
    },
    CatalogEntry {
        label: "Carrot",
        id: CatalogText {
            name: "Wortel",
            recipes: [
                "Sup Wortel Kentang",
                "Tumis Wortel Buncis",
                "Perkedel Wortel",
            ],
            calories: "41 kkal per 100 gram",
            vitamins: &["Vitamin A", "Vitamin K", "Vitamin C"],
            benefits: &[
                "Menjaga kesehatan mata",
                "Mendukung kesehatan kulit",
            ],
            storage_tips: "Potong daunnya, lalu simpan wortel dalam kantong plastik di lemari es hingga 2 minggu.",
        },
        en: CatalogText {
            name: "Carrot",
            recipes: [
                "Carrot and Potato Soup",
                "Carrot and Green Bean Stir-Fry",
                "Carrot Fritters",
            ],
            calories: "41 kcal per 100 grams",
            vitamins: &["Vitamin A", "Vitamin K", "Vitamin C"],
            benefits: &[
                "Supports eye health",
                "Supports skin health",
            ],
            storage_tips: "Trim the tops, then keep carrots in a plastic bag in the fridge for up to 2 weeks.",
        },
    },
    CatalogEntry {
        label: "Cauliflower",
        id: CatalogText {
            name: "Kembang Kol",
            recipes: [
                "Kembang Kol Goreng Tepung",
                "Cah Kembang Kol Udang",
                "Sup Kembang Kol Wortel",
            ],
            calories: "25 kkal per 100 gram",
            vitamins: &["Vitamin C", "Vitamin K", "Folat"],
            benefits: &[
                "Sumber serat yang baik",
                "Mengandung kolin untuk fungsi otak",
            ],
            storage_tips: "Simpan kembang kol dengan tangkai menghadap ke bawah dalam kantong longgar di lemari es.",
        },
        en: CatalogText {
            name: "Cauliflower",
            recipes: [
                "Battered Fried Cauliflower",
                "Cauliflower and Shrimp Stir-Fry",
                "Cauliflower and Carrot Soup",
            ],
            calories: "25 kcal per 100 grams",
            vitamins: &["Vitamin C", "Vitamin K", "Folate"],
            benefits: &[
                "A good source of fiber",
                "Contains choline for brain function",
            ],
            storage_tips: "Store cauliflower stem side down in a loose bag in the fridge.",
        },
    },
    CatalogEntry {
        label: "Cucumber",
        id: CatalogText {
            name: "Mentimun",
            recipes: [
                "Acar Mentimun Wortel",
                "Salad Mentimun Segar",
                "Sayur Asem Mentimun",
            ],
            calories: "15 kkal per 100 gram",
            vitamins: &["Vitamin K", "Vitamin C", "Kalium"],
            benefits: &[
                "Menjaga hidrasi tubuh",
                "Membantu menurunkan tekanan darah",
            ],
            storage_tips: "Bungkus mentimun dengan tisu kering dan simpan di bagian paling hangat lemari es.",
        },
        en: CatalogText {
            name: "Cucumber",
            recipes: [
                "Cucumber and Carrot Pickles",
                "Fresh Cucumber Salad",
                "Sour Tamarind Soup with Cucumber",
            ],
            calories: "15 kcal per 100 grams",
            vitamins: &["Vitamin K", "Vitamin C", "Potassium"],
            benefits: &[
                "Keeps the body hydrated",
                "Helps lower blood pressure",
            ],
            storage_tips: "Wrap cucumbers in a dry paper towel and keep them in the warmest part of the fridge.",
        },
    },
    CatalogEntry {
        label: "Papaya",
        id: CatalogText {
            name: "Pepaya",
            recipes: [
                "Tumis Pepaya Muda",
                "Sayur Godog Pepaya",
                "Rujak Pepaya",
            ],
            calories: "43 kkal per 100 gram",
            vitamins: &["Vitamin C", "Vitamin A", "Folat"],
            benefits: &[
                "Membantu pencernaan berkat enzim papain",
                "Meningkatkan daya tahan tubuh",
            ],
            storage_tips: "Matangkan pepaya di suhu ruang, lalu simpan di lemari es dan habiskan dalam 3 hari.",
        },
        en: CatalogText {
            name: "Papaya",
            recipes: [
                "Stir-Fried Green Papaya",
                "Boiled Papaya Vegetable Soup",
                "Spicy Papaya Fruit Salad",
            ],
            calories: "43 kcal per 100 grams",
            vitamins: &["Vitamin C", "Vitamin A", "Folate"],
            benefits: &[
                "Aids digestion thanks to the enzyme papain",
                "Boosts the immune system",
            ],
            storage_tips: "Ripen papaya at room temperature, then refrigerate and finish it within 3 days.",
        },
    },
    CatalogEntry {
        label: "Potato",
        id: CatalogText {
            name: "Kentang",
            recipes: [
                "Perkedel Kentang",
                "Kentang Balado",
                "Sup Kentang Ayam",
            ],
            calories: "77 kkal per 100 gram",
            vitamins: &["Vitamin C", "Vitamin B6", "Kalium"],
            benefits: &[
                "Sumber energi dari karbohidrat kompleks",
                "Membantu menjaga tekanan darah",
            ],
            storage_tips: "Simpan kentang di tempat gelap, sejuk, dan berventilasi, jauh dari bawang.",
        },
        en: CatalogText {
            name: "Potato",
            recipes: [
                "Potato Fritters",
                "Potato Balado",
                "Chicken and Potato Soup",
            ],
            calories: "77 kcal per 100 grams",
            vitamins: &["Vitamin C", "Vitamin B6", "Potassium"],
            benefits: &[
                "Provides energy from complex carbohydrates",
                "Helps maintain blood pressure",
            ],
            storage_tips: "Keep potatoes in a dark, cool, ventilated place away from onions.",
        },
    },
    CatalogEntry {
        label: "Pumpkin",
        id: CatalogText {
            name: "Labu Kuning",
            recipes: [
                "Kolak Labu Kuning",
                "Sup Krim Labu Kuning",
                "Bubur Labu Kuning",
            ],
            calories: "26 kkal per 100 gram",
            vitamins: &["Vitamin A", "Vitamin C", "Vitamin E"],
            benefits: &[
                "Menjaga kesehatan mata",
                "Mendukung sistem imun",
            ],
            storage_tips: "Labu kuning utuh tahan beberapa minggu di tempat sejuk; simpan potongannya di lemari es.",
        },
        en: CatalogText {
            name: "Pumpkin",
            recipes: [
                "Pumpkin in Sweet Coconut Milk",
                "Cream of Pumpkin Soup",
                "Pumpkin Porridge",
            ],
            calories: "26 kcal per 100 grams",
            vitamins: &["Vitamin A", "Vitamin C", "Vitamin E"],
            benefits: &[
                "Supports eye health",
                "Supports the immune system",
            ],
            storage_tips: "A whole pumpkin keeps for weeks in a cool place; refrigerate cut pieces.",
        },
    },
    CatalogEntry {
        label: "Radish",
        id: CatalogText {
            name: "Lobak",
            recipes: [
                "Sup Lobak Iga",
                "Acar Lobak",
                "Tumis Lobak Udang",
            ],
            calories: "16 kkal per 100 gram",
            vitamins: &["Vitamin C", "Folat", "Kalium"],
            benefits: &[
                "Membantu detoksifikasi hati",
                "Melancarkan pencernaan",
            ],
            storage_tips: "Buang daunnya, lalu simpan lobak dalam kantong plastik di lemari es hingga 2 minggu.",
        },
        en: CatalogText {
            name: "Radish",
            recipes: [
                "Radish and Beef Rib Soup",
                "Pickled Radish",
                "Radish Stir-Fried with Shrimp",
            ],
            calories: "16 kcal per 100 grams",
            vitamins: &["Vitamin C", "Folate", "Potassium"],
            benefits: &[
                "Supports liver detoxification",
                "Keeps digestion regular",
            ],
            storage_tips: "Remove the leaves, then keep radishes in a plastic bag in the fridge for up to 2 weeks.",
        },
    },
    CatalogEntry {
        label: "Tomato",
        id: CatalogText {
            name: "Tomat",
            recipes: [
                "Sambal Tomat",
                "Sup Tomat Telur",
                "Tumis Tomat Tahu",
            ],
            calories: "18 kkal per 100 gram",
            vitamins: &["Vitamin C", "Vitamin K", "Vitamin A"],
            benefits: &[
                "Kaya likopen sebagai antioksidan",
                "Mendukung kesehatan jantung",
            ],
            storage_tips: "Simpan tomat di suhu ruang hingga matang, lalu pindahkan ke lemari es bila perlu.",
        },
        en: CatalogText {
            name: "Tomato",
            recipes: [
                "Tomato Sambal",
                "Tomato and Egg Soup",
                "Tomato and Tofu Stir-Fry",
            ],
            calories: "18 kcal per 100 grams",
            vitamins: &["Vitamin C", "Vitamin K", "Vitamin A"],
            benefits: &[
                "Rich in the antioxidant lycopene",
                "Supports heart health",
            ],
            storage_tips: "Keep tomatoes at room temperature until ripe, then refrigerate if needed.",
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entry_is_well_formed() {
        for entry in CATALOG {
            for locale in [Locale::Indonesian, Locale::English] {
                let rec = entry.recommendation(locale);
                assert!(rec.is_well_formed(), "entry {} is malformed", entry.label);
                assert_eq!(rec.recipes.len(), 3);
                assert!(!rec.nutrition.is_summary());
            }
        }
    }

    #[test]
    fn test_catalog_covers_classifier_labels() {
        let expected = [
            "Bean",
            "Bitter_Gourd",
            "Bottle_Gourd",
            "Brinjal",
            "Broccoli",
            "Cabbage",
            "Capsicum",
            "Carrot",
            "Cauliflower",
            "Cucumber",
            "Papaya",
            "Potato",
            "Pumpkin",
            "Radish",
            "Tomato",
        ];
        for label in expected {
            assert!(lookup(label).is_some(), "missing {}", label);
        }
        assert_eq!(labels().count(), expected.len());
    }

    #[test]
    fn test_lookup_is_lenient() {
        assert_eq!(lookup("bitter gourd").unwrap().label, "Bitter_Gourd");
        assert_eq!(lookup("CARROT").unwrap().id.name, "Wortel");
        assert!(lookup("Durian").is_none());
    }

    #[test]
    fn test_subject_resolution() {
        let subject = Subject::resolve("Carrot", Locale::Indonesian);
        assert_eq!(subject.display_name, "Wortel");
        assert!(subject.forbids_source_label());

        let english = Subject::resolve("Carrot", Locale::English);
        assert!(!english.forbids_source_label());

        let bean = Subject::resolve("Bean", Locale::English);
        assert_eq!(bean.display_name, "Green Bean");
        assert!(!bean.forbids_source_label());

        let unknown = Subject::resolve("Dragon_Fruit", Locale::Indonesian);
        assert_eq!(unknown.display_name, "Dragon Fruit");
    }

    #[test]
    fn test_fallback_for_unknown_is_degraded() {
        let rec = fallback_for(UNKNOWN_SUBJECT, Locale::Indonesian);
        assert!(rec.nutrition.is_summary());
        assert!(rec.is_well_formed());

        let rec = fallback_for("Durian", Locale::Indonesian);
        assert_eq!(rec, degraded_fallback(Locale::Indonesian));

        let rec = fallback_for("Carrot", Locale::Indonesian);
        assert_eq!(rec.recipes[0], "Sup Wortel Kentang");
    }

    #[test]
    fn test_english_fallback_is_english() {
        let rec = fallback_for("Carrot", Locale::English);

        assert_eq!(rec.recipes[0], "Carrot and Potato Soup");
        assert!(rec.storage_tips.starts_with("Trim the tops"));
        match rec.nutrition {
            Nutrition::Detailed { calories, .. } => {
                assert_eq!(calories.as_deref(), Some("41 kcal per 100 grams"));
            }
            other => panic!("unexpected nutrition {:?}", other),
        }

        for entry in CATALOG {
            let id = entry.recommendation(Locale::Indonesian);
            let en = entry.recommendation(Locale::English);
            assert_ne!(id.recipes, en.recipes, "entry {} is not translated", entry.label);
            assert_ne!(id.storage_tips, en.storage_tips);
        }
    }
}
