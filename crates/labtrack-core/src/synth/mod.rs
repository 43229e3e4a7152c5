//! Synthetic result generation for bulk-loaded tests.
//!
//! Test uploads carry no outcome data, so the loader fabricates it here: a
//! fixed keyword table maps a test's name to a delivery-delay range and a
//! closed set of result alternatives, each with its fixed interpretation.
//! Every random choice goes through a caller-supplied [`rand::Rng`] so loads
//! can be made reproducible with a seeded generator.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A synthesized outcome triple.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyntheticResult {
    pub result: String,
    pub interpretation: String,
    pub details: String,
}

/// One result alternative and its fixed interpretation.
struct Outcome {
    result: &'static str,
    interpretation: &'static str,
}

/// A keyword entry: delivery-delay bounds plus the closed outcome set.
struct KeywordProfile {
    keyword: &'static str,
    delay_days: (i64, i64),
    outcomes: &'static [Outcome],
    details: &'static str,
}

/// Ordered keyword table. First substring match on the lowercased test name
/// wins.
const PROFILES: &[KeywordProfile] = &[
    KeywordProfile {
        keyword: "covid",
        delay_days: (1, 2),
        outcomes: &[
            Outcome { result: "Negativo", interpretation: "No se detectó el virus" },
            Outcome { result: "Positivo", interpretation: "Infección activa" },
        ],
        details: "Prueba PCR realizada correctamente.",
    },
    KeywordProfile {
        keyword: "paternidad",
        delay_days: (5, 10),
        outcomes: &[
            Outcome { result: "Inclusión", interpretation: "Coincidencia de marcadores genéticos" },
            Outcome { result: "Exclusión", interpretation: "No hay relación biológica" },
        ],
        details: "Prueba de ADN realizada con precisión.",
    },
    KeywordProfile {
        keyword: "hemograma",
        delay_days: (1, 3),
        outcomes: &[
            Outcome { result: "Normal", interpretation: "Valores dentro de los rangos esperados" },
            Outcome { result: "Anormal", interpretation: "Anemia detectada" },
        ],
        details: "Conteo completo de células sanguíneas.",
    },
    KeywordProfile {
        keyword: "influenza",
        delay_days: (2, 4),
        outcomes: &[
            Outcome { result: "Negativo", interpretation: "No se detectó el virus" },
            Outcome { result: "Positivo", interpretation: "Infección viral activa" },
        ],
        details: "Prueba rápida de influenza.",
    },
    KeywordProfile {
        keyword: "alergia",
        delay_days: (3, 7),
        outcomes: &[
            Outcome { result: "Sin alergias", interpretation: "Sin reacciones" },
            Outcome { result: "Alergias detectadas", interpretation: "Reacción alérgica" },
        ],
        details: "Panel de alérgenos completado.",
    },
    KeywordProfile {
        keyword: "electrocardiograma",
        delay_days: (1, 2),
        outcomes: &[
            Outcome { result: "Normal", interpretation: "Ritmo cardíaco regular" },
            Outcome { result: "Anormal", interpretation: "Arritmia detectada" },
        ],
        details: "ECG realizado sin complicaciones.",
    },
    KeywordProfile {
        keyword: "anticuerpo",
        delay_days: (3, 5),
        outcomes: &[
            Outcome { result: "Positivo", interpretation: "Presencia de anticuerpos" },
            Outcome { result: "Negativo", interpretation: "No se detectaron anticuerpos" },
        ],
        details: "Prueba serológica completada.",
    },
    KeywordProfile {
        keyword: "hepatitis",
        delay_days: (5, 10),
        outcomes: &[
            Outcome { result: "Negativo", interpretation: "No se detectó infección" },
            Outcome { result: "Positivo", interpretation: "Infección detectada" },
        ],
        details: "Análisis para hepatitis realizado.",
    },
];

/// Delay bounds for any test name that matches no keyword.
const FALLBACK_DELAY: (i64, i64) = (7, 14);

fn match_profile(test_name: &str) -> Option<&'static KeywordProfile> {
    let lower = test_name.to_lowercase();
    PROFILES.iter().find(|p| lower.contains(p.keyword))
}

/// Inclusive delivery-delay bounds for a test name.
pub fn delay_bounds(test_name: &str) -> (i64, i64) {
    match_profile(test_name)
        .map(|p| p.delay_days)
        .unwrap_or(FALLBACK_DELAY)
}

/// Draw a delivery delay in days for a test name.
pub fn delivery_delay_days<R: Rng>(test_name: &str, rng: &mut R) -> i64 {
    let (min, max) = delay_bounds(test_name);
    rng.gen_range(min..=max)
}

/// Synthesize an outcome triple for a test name.
///
/// The keyword fixes the alternatives; the choice among them is uniform.
/// Names matching no keyword get the fixed indeterminate triple.
pub fn synthesize<R: Rng>(test_name: &str, rng: &mut R) -> SyntheticResult {
    match match_profile(test_name) {
        Some(profile) => {
            let outcome = &profile.outcomes[rng.gen_range(0..profile.outcomes.len())];
            SyntheticResult {
                result: outcome.result.to_string(),
                interpretation: outcome.interpretation.to_string(),
                details: profile.details.to_string(),
            }
        }
        None => SyntheticResult {
            result: "Indeterminado".to_string(),
            interpretation: "No se pudo interpretar el resultado".to_string(),
            details: "Datos insuficientes para el análisis.".to_string(),
        },
    }
}
