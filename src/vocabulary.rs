//! Built-in lookup tables for the reporting laboratory's catalogue.
//!
//! All tables are compile-time `phf` structures. [`Vocabulary`] is the immutable
//! handle the classifier, the datum parser and the association engine query by
//! reference; the built-in one looks entries up in the static tables directly.
//! Tests and callers with a different catalogue can extend a clone, and their
//! additions are kept in small owned overlays.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use phf::{phf_map, phf_set};

/// Labels that carry their value on the same line, as `Label: value`.
pub static STANDALONE_LABELS: &[&str] = &[
    "CIP",
    "Data obtencio mostra",
    "Data recepcio mostra",
    "Edat",
    "Localitzacio",
    "Metge",
    "N Laboratori",
    "NHC",
    "Observacions",
    "Pacient",
    "Procedencia",
    "Servei",
    "Sexe",
    "Unitat de tractament",
];

/// Instrument-code prefixes that open a regular field label (`<prefix>-...`).
pub static FIELD_PREFIXES: &[&str] = &[
    "Ers(San)",
    "Gas(vSan)",
    "Hb(San)",
    "Hb(vSan)",
    "Lks(San)",
    "Pac(vSan)",
    "Pla",
    "Ren",
    "San",
    "Srm",
    "vPla",
];

/// Raw label to canonical taxonomy path.
pub static FIELD_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    // Standalone fields
    "CIP" => "Pacient/CIP",
    "Data obtencio mostra" => "Peticio/Data",
    "Edat" => "Pacient/Edat",
    "Localitzacio" => "Pacient/Ubicacio",
    "Metge" => "Peticio/Solicitant",
    "N Laboratori" => "Peticio/ID",
    "NHC" => "Pacient/NHC",
    "Observacions" => "Peticio/Observacions",
    "Pacient" => "Pacient/Nom",
    "Procedencia" => "Peticio/Hospital",
    "Servei" => "Pacient/Servei",
    "Sexe" => "Pacient/Sexe",
    "Unitat de tractament" => "Pacient/Unitat",

    // Regular fields
    "Ers(San)-Hemoglobina;c.massa(CHCM)" => "Sang/CHCM",
    "Ers(San)-Hemoglobina;massa entitica(HCM)" => "Sang/HCM",
    "Ers(San)-Reticulocits;fr.nom." => "Sang/%Reticulocits",
    "Ers(San)-Volum eritrocitic;amplada de la distribucio rel." => "Sang/ADE",
    "Gas(vSan)-Dioxid de carboni;pr.parc." => "Sang(v)/pCO2",
    "Gas(vSan)-Oxigen;pr.parc." => "Sang(v)/pO2",
    "Hb(San)-Hemoglobina A1c;fr.subst.(IFCC)" => "Sang/HbA1c",
    "Hb(San)-Hemoglobina A1c;fr.subst.(expressat en %)" => "Sang/%HbA1c",
    "Hb(vSan)-Oxigen;fr.sat." => "Sang(v)/%SatHb",
    "Lks(San)-Basofils;fr.nom." => "Sang/%Basofils",
    "Lks(San)-Eosinofils;fr.nom." => "Sang/%Eosinofils",
    "Lks(San)-Limfocits;fr.nom." => "Sang/%Limfocits",
    "Lks(San)-Metamielotics;fr.nom" => "Sang/%Metamielocits",
    "Lks(San)-Monocits;fr.nom." => "Sang/%Monocits",
    "Lks(San)-Neutrofils(segmentats);fr.nom." => "Sang/%Neutrofils",
    "Pac(vSan)-Plasma;pH" => "Sang(v)/pH",
    "Pla-Alanina-aminotransferasa;c.cat." => "Serum/ALT",
    "Pla-Anticoagulant lupic;c.arb.(negatiu;dubtos;positiu)" => "Plasma/Anticoagulant-Lupic",
    "Pla-Aspartat-aminotransferasa;c.cat." => "Serum/AST",
    "Pla-Bilirubina;c.subst." => "Serum/Bilirrubina",
    "Pla-Calci(II);c.subst." => "Serum/Calci",
    "Pla-Clorur;c.subst." => "Serum/Clorur",
    "Pla-Coagulacio induida per factor tissular;INR(temps de" => "Plasma/INR",
    "Pla-Coagulacio induida per factor tissular;INR(temps" => "Plasma/INR",
    "Pla-Coagulacio induida per factor tissular;temps rel.(temps" => "Plasma/TP",
    "Pla-Coagulacio induida per una superficie;temps rel.(TTPA)" => "Plasma/TTPA",
    "Pla-Creatina-cinasa;c.cat." => "Serum/CK",
    "Pla-Creatinini;c.subst." => "Serum/Creatinina",
    "Pla-Fibrinogen(coag);c.massa" => "Plasma/Fibrinogen",
    "Pla-Fibrinogen;c.massa(coagul.;Clauss)" => "Plasma/Fibrinogen",
    "Pla-Fibrinogen;c.massa(coagul.;derivat)" => "Plasma/Fibrinogen",
    "Pla-Glucosa;c.subst." => "Sang/Glucosa",
    "Pla-Io calci;c.subst.(pH 7.4)" => "Serum/Calci(ionitzat)",
    "Pla-Io potassi;c.subst." => "Serum/Potassi",
    "Pla-Io sodi;c.subst." => "Serum/Sodi",
    "Pla-Lactat;c.subst." => "Serum/Lactat",
    "Pla-Proteina C reactiva;c.massa(CRM 470)" => "Serum/PCR",
    "Pla-Proteina;c.massa" => "Serum/Proteines",
    "Pla-Troponina T;c.massa" => "Serum/TnT",
    "Pla-Urea;c.subst." => "Sang/Urea",
    "Pla-alfa-Amilasa;c.cat." => "Serum/Alfa-Amilasa",
    "Ren-Filtrat glomerular;cabal vol.(equacio CKD-EPI)" => "Renal/Filtrat(CKD-EPI)",
    "San-Basofils;c.nom." => "Sang/Basofils",
    "San-Eosinofils;c.nom." => "Sang/Eosinofils",
    "San-Eritrocits;c.nom." => "Sang/Eritrocits",
    "San-Eritrocits;fr.vol.(hematocrit)" => "Sang/Hematocrit",
    "San-Eritrocits;v.entitic(VCM)" => "Sang/VCM",
    "San-Eritrocits;vol.entitic(VCM)" => "Sang/VCM",
    "San-Eritrosedimentacio;long." => "Sang/VSG",
    "San-Hemoglobina;c.massa" => "Sang/Hemoglobina",
    "San-Leucocits;c.nom." => "Sang/Leucocits",
    "San-Limfocits T CD4;c.nom." => "Sang/Limfocits(CD4)",
    "San-Limfocits;c.nom." => "Sang/Limfocits",
    "San-Monocits;c.nom." => "Sang/Monocits",
    "San-Neutrofils(segmentats);c.nom." => "Sang/Neutrofils",
    "San-Plaquetes;c.nom." => "Sang/Plaquetes",
    "San-Plaquetes;vol.entitic(VPM)" => "Sang/VPM",
    "San-Reticulocits;c.nom." => "Sang/Recitulocits",
    "Srm-Ac.(IgG)anti-b2-glicoprot(CLIA);c.subst.arb." => "Serum/Anti-B2GP(IgG)",
    "Srm-Ac.(IgG)anticardiolipina(CLIA);c.subst.arb." => "Serum/Anti-Cardiolipina(IgG)",
    "Srm-Ac.(IgM)anti-b2-glicoprot(CLIA);c.subst.arb." => "Serum/Anti-B2GP(IgM)",
    "Srm-Ac.(IgM)anticardiolipina(CLIA);c.subst.arb." => "Serum/Anti-Cardiolipina(IgM)",
    "Srm-Ac.antimieloperoxi(MPO)(CLIA);c.subst.arb." => "Serum/Anti-MPO",
    "Srm-Ac.antiproteinasa 3(PR3)(CLIA);c.subst.arb." => "Serum/Anti-PR3",
    "Srm-Alanina-aminotransferasa;c.cat." => "Serum/ALT",
    "Srm-Albumina;c.massa(CRM 470)" => "Serum/Albumina",
    "Srm-Albumina;fr.massa" => "Serum/Albumina",
    "Srm-Anticossos anti-DNA doble cadena;c.subst.arb." => "Serum/Anti-dsDNA",
    "Srm-Anticossos antimieloperoxidasa(MPO)(CLIA);" => "Serum/Anti-MPO",
    "Srm-Anticossos antinuclears i citoplasmatics;c.arb." => "Serum/ANAs",
    "Srm-Anticossos(IgG)anticardiolipina(CLIA);c.subst.arb." => "Serum/Anti-Cardiolipina(IgG)",
    "Srm-Anticossos(IgM)anticardiolipina(CLIA);c.subst.arb." => "Serum/Anti-Cardiolipina(IgG)",
    "Srm-Aspartat-aminotransferasa;c.cat." => "Serum/AST",
    "Srm-Bilirubina;c.subst." => "Serum/Bilirrubina",
    "Srm-Calci(II);c.subst." => "Serum/Calci",
    "Srm-Clorur;c.subst." => "Serum/Clorur",
    "Srm-Cobalamines;c.subst." => "Serum/Cobalamines",
    "Srm-Colesterol d'HDL/Colesterol;quocient subst." => "Serum/HDL:CT",
    "Srm-Colesterol d'HDL;c.subst." => "Serum/HDL",
    "Srm-Colesterol d'LDL;c.subst.(segons Friedewald)" => "Serum/LDL",
    "Srm-Colesterol(exclos el d'HDL);c.subst." => "Serum/No-HDL",
    "Srm-Colesterol;c.subst." => "Serum/Colesterol",
    "Srm-Component monoclonal;c.massa" => "Serum/Component-Monoclonal",
    "Srm-Creatinini;c.subst." => "Serum/Creatinina",
    "Srm-Factors reumatoides;c.subst.arb.(OMS 64/2)" => "Serum/FR",
    "Srm-Folats;c.subst." => "Serum/Folats",
    "Srm-Fosfat;c.subst." => "Serum/Fosfat",
    "Srm-Fosfatasa alcalina;c.cat." => "Serum/FA",
    "Srm-Glucosa;c.subst." => "Serum/Glucosa",
    "Srm-Glucosa;c.subst.(mitjana estimada)" => "Serum/Glucosa",
    "Srm-Io potassi;c.subst." => "Serum/Potassi",
    "Srm-Io sodi;c.subst." => "Serum/Sodi",
    "Srm-Magnesi(II);c.subst." => "Serum/Magnesi",
    "Srm-Prealbumina(transtiretina);c.massa" => "Serum/Prealbumina",
    "Srm-Proteina C reactiva;c.massa" => "Serum/PCR",
    "Srm-Proteina C reactiva;c.massa(CRM 470)" => "Serum/PCR",
    "Srm-Proteina;c.massa" => "Serum/Proteina",
    "Srm-Tirotropina;c.subst.arb." => "Serum/TSH",
    "Srm-Tiroxina(no unida a proteina);c.subst." => "Serum/T4L",
    "Srm-Triglicerid;c.subst." => "Serum/Triglicerid",
    "Srm-Urat;c.subst." => "Serum/Urat",
    "Srm-Urea;c.subst." => "Serum/Urea",
    "Srm-alfa 1-Globulina;fr.massa" => "Serum/A1-Globulina",
    "Srm-alfa 2-Globulina;fr.massa" => "Serum/A2-Globulina",
    "Srm-beta-Globulina;fr.massa" => "Serum/B-Globulina",
    "Srm-gamma-Globulina;fr.massa" => "Serum/G-Globulina",
    "Srm-gamma-Glutamiltransferasa;c.cat." => "Serum/GGT",
    "vPla-Exces de base(llocs enllaçants d'H+);c.subst." => "Sang(v)/EB",
    "vPla-Hidrogencarbonat;c.subst" => "Sang(v)/Bicarbonat",
};

/// Canonical fields that print two independent measurements on one row group.
pub static DUAL_FIELDS: phf::Set<&'static str> = phf_set! {
    "Serum/Colesterol",
    "Serum/Glucosa",
    "Serum/HDL",
    "Serum/LDL",
    "Serum/No-HDL",
    "Serum/Triglicerid",
};

/// Unit strings recognized verbatim (case-sensitive).
pub static UNITS: phf::Set<&'static str> = phf_set! {
    "%",
    "1",
    "CU",
    "U/L",
    "fL",
    "g/L",
    "karb.u./L",
    "kint.u./L",
    "ku.i./L",
    "mL/min",
    "mg/L",
    "mg/dL",
    "mm",
    "mmHg",
    "mmol/L",
    "mmol/mol",
    "mu.int./L",
    "nmol/L",
    "pg",
    "pmol/L",
    "ukat/L",
    "umol/L",
    "x10E12/L",
    "x10E9/L",
    "µmol/L",
};

lazy_static! {
    static ref BUILTIN: Vocabulary = Vocabulary::from_tables();
}

/// Immutable lookup configuration shared by every stage of the parser.
///
/// Lookups go to the static tables above when the vocabulary was built with
/// [`Vocabulary::from_tables`]. Entries added with the `with_*` builders live
/// in owned overlays and are consulted first.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    builtin_tables: bool,
    standalone_labels: Vec<String>,
    field_prefixes: Vec<String>,
    field_names: HashMap<String, String>,
    dual_fields: HashSet<String>,
    units: HashSet<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

impl Vocabulary {
    /// The process-wide built-in vocabulary.
    pub fn builtin() -> &'static Vocabulary {
        &BUILTIN
    }

    /// A vocabulary backed by the static tables, with no additions.
    pub fn from_tables() -> Self {
        Self {
            builtin_tables: true,
            ..Self::empty()
        }
    }

    /// Build a vocabulary with no entries at all.
    pub fn empty() -> Self {
        Self {
            builtin_tables: false,
            standalone_labels: Vec::new(),
            field_prefixes: Vec::new(),
            field_names: HashMap::new(),
            dual_fields: HashSet::new(),
            units: HashSet::new(),
        }
    }

    /// Add a standalone label (without the trailing colon).
    pub fn with_standalone_label(mut self, label: impl Into<String>) -> Self {
        self.standalone_labels.push(label.into());
        self
    }

    /// Add an instrument-code prefix (without the trailing dash).
    pub fn with_field_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.field_prefixes.push(prefix.into());
        self
    }

    /// Map a raw label to a canonical name, overriding the static table.
    pub fn with_field_name(mut self, raw: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.field_names.insert(raw.into(), canonical.into());
        self
    }

    /// Flag a canonical name as a dual field.
    pub fn with_dual_field(mut self, canonical: impl Into<String>) -> Self {
        self.dual_fields.insert(canonical.into());
        self
    }

    /// Add a recognized unit string.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.units.insert(unit.into());
        self
    }

    fn tables<T>(&self, table: T) -> Option<T> {
        self.builtin_tables.then_some(table)
    }

    /// Standalone labels, without their colon.
    pub fn standalone_labels(&self) -> impl Iterator<Item = &str> {
        self.tables(STANDALONE_LABELS)
            .into_iter()
            .flatten()
            .copied()
            .chain(self.standalone_labels.iter().map(String::as_str))
    }

    /// Regular field prefixes, without their dash.
    pub fn field_prefixes(&self) -> impl Iterator<Item = &str> {
        self.tables(FIELD_PREFIXES)
            .into_iter()
            .flatten()
            .copied()
            .chain(self.field_prefixes.iter().map(String::as_str))
    }

    /// Canonical name for a raw label, or the label itself when unmapped.
    pub fn canonical_name<'a>(&'a self, raw: &'a str) -> &'a str {
        if let Some(canonical) = self.field_names.get(raw) {
            return canonical;
        }
        self.tables(&FIELD_NAMES)
            .and_then(|names| names.get(raw).copied())
            .unwrap_or(raw)
    }

    /// Whether a canonical name reports two measurements per row group.
    pub fn is_dual_field(&self, canonical: &str) -> bool {
        self.dual_fields.contains(canonical)
            || self.tables(&DUAL_FIELDS).is_some_and(|set| set.contains(canonical))
    }

    /// Whether the content is exactly a known unit.
    pub fn is_unit(&self, content: &str) -> bool {
        self.units.contains(content) || self.tables(&UNITS).is_some_and(|set| set.contains(content))
    }
}
