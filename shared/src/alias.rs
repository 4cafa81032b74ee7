/// Indicator code -> display label, in dropdown order.
pub const FIELD_ALIASES: [(&str, &str); 15] = [
    ("K_Miskin", "Keparahan Kemiskinan"),
    ("Indeks_Fis", "Indeks Kapasitas Fiskal"),
    ("APM_SD__7_", "APM SD"),
    ("Ats__DO__D", "ATS DO SD"),
    ("APM_SLTP__", "APM SLTP"),
    ("Ats__DO__1", "ATS DO SLTP"),
    ("APM_SLTA__", "APM SLTA"),
    ("Ats__DO_At", "ATS DO SLTA"),
    ("Ind_Pendid", "Ind Pendidikan APM"),
    ("Indeks_Pen", "Indeks Pendidikan DO"),
    ("Indeks_P_1", "Indeks Pendidikan"),
    ("Indeks_Kem", "Indeks Kemiskinan"),
    ("Indeks_Kap", "Indeks Kapasitas Keuangan Daerah"),
    ("Indeks_Tot", "Indeks Total Pendidikan"),
    ("Ranking", "Ranking"),
];

/// Human-readable label for an indicator code. Unknown codes are returned as-is.
pub fn label(code: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, alias)| *alias)
        .unwrap_or(code)
}

pub fn is_known(code: &str) -> bool {
    FIELD_ALIASES.iter().any(|(known, _)| *known == code)
}

/// All `(code, label)` pairs in registry order.
pub fn aliases() -> impl Iterator<Item = (&'static str, &'static str)> {
    FIELD_ALIASES.iter().copied()
}
