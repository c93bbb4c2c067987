//! Prompt construction for recommendation generation

use crate::catalog::Subject;
use crate::model::Locale;
use crate::ports::GenerationRequest;

/// Builds generation prompts in the configured language
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    locale: Locale,
}

impl PromptBuilder {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Build the request for a subject
    ///
    /// The prompt names the translated subject and, when it differs, forbids
    /// the canonical label in the output.
    pub fn build(&self, subject: &Subject) -> GenerationRequest {
        let name = &subject.display_name;
        let forbidden = subject
            .forbids_source_label()
            .then(|| subject.label_as_text());

        let prompt = match self.locale {
            Locale::Indonesian => indonesian_prompt(name, forbidden.as_deref()),
            Locale::English => english_prompt(name, forbidden.as_deref()),
        };

        let system = match self.locale {
            Locale::Indonesian => {
                "Kamu adalah ahli gizi dan juru masak Indonesia. Jawab hanya dengan JSON yang valid."
            }
            Locale::English => "You are a nutritionist and home cook. Output only valid JSON.",
        };

        GenerationRequest {
            system: system.to_string(),
            prompt,
        }
    }
}

fn indonesian_prompt(name: &str, forbidden: Option<&str>) -> String {
    let mut prompt = format!(
        "Berikan rekomendasi masakan dan informasi gizi untuk sayuran \"{name}\" dalam Bahasa Indonesia.\n\n"
    );

    prompt.push_str(
        r#"Balas HANYA dengan objek JSON mentah tanpa kalimat pembuka, penutup, atau blok kode, dengan struktur berikut:
{
  "recipes": ["Nama Resep 1", "Nama Resep 2", "Nama Resep 3"],
  "nutrition": {
    "calories": "XX kkal per 100 gram",
    "vitamins": ["Vitamin A", "Vitamin C"],
    "benefits": ["Manfaat 1", "Manfaat 2"]
  },
  "storageTips": "Satu kalimat tips penyimpanan"
}

Aturan:
"#,
    );

    prompt.push_str(&format!(
        "- Tepat 3 nama resep masakan nyata yang menggunakan {name}.\n"
    ));
    prompt.push_str("- Ganti semua contoh di atas dengan konten sebenarnya; jangan menyalin contohnya.\n");
    prompt.push_str("- Kalori ditulis sebagai angka nyata, bukan \"XX\".\n");
    prompt.push_str("- Seluruh teks dalam Bahasa Indonesia.\n");

    if let Some(label) = forbidden {
        prompt.push_str(&format!(
            "- Jangan gunakan kata \"{label}\" di mana pun dalam jawaban; sebut sayuran ini \"{name}\".\n"
        ));
    }

    prompt
}

fn english_prompt(name: &str, forbidden: Option<&str>) -> String {
    let mut prompt =
        format!("Give cooking and nutrition recommendations for the vegetable \"{name}\" in English.\n\n");

    prompt.push_str(
        r#"Respond with ONLY a raw JSON object, with no introduction, closing remarks, or code fences, matching this structure:
{
  "recipes": ["Recipe Name 1", "Recipe Name 2", "Recipe Name 3"],
  "nutrition": {
    "calories": "XX kcal per 100 grams",
    "vitamins": ["Vitamin A", "Vitamin C"],
    "benefits": ["Benefit 1", "Benefit 2"]
  },
  "storageTips": "One sentence of storage advice"
}

Rules:
"#,
    );

    prompt.push_str(&format!("- Exactly 3 real dish names that use {name}.\n"));
    prompt.push_str("- Replace every example value above with real content; never copy the examples.\n");
    prompt.push_str("- Calories must be a real number, not \"XX\".\n");

    if let Some(label) = forbidden {
        prompt.push_str(&format!(
            "- Do not use the word \"{label}\" anywhere in the answer; call the vegetable \"{name}\".\n"
        ));
    }

    prompt
}
