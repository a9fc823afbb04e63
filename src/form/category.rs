//! Form categories and the per-category defaults table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FormCategory {
    PharmaReps,
    Msl,
    MedDevices,
    Kam,
    ConsumerHealth,
    AnimalHealth,
    Contact,
    RoiCalculator,
    General,
}

/// Everything category-specific the pipeline needs, in one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryProfile {
    pub category: FormCategory,
    pub id: &'static str,
    pub display_name: &'static str,
    pub default_role: &'static str,
}

const PROFILES: [CategoryProfile; 9] = [
    CategoryProfile {
        category: FormCategory::PharmaReps,
        id: "pharma_reps",
        display_name: "Pharmaceutical Representatives",
        default_role: "Pharmaceutical Sales Representative",
    },
    CategoryProfile {
        category: FormCategory::Msl,
        id: "msl",
        display_name: "Medical Science Liaison",
        default_role: "Medical Science Liaison",
    },
    CategoryProfile {
        category: FormCategory::MedDevices,
        id: "med_devices",
        display_name: "Medical Devices",
        default_role: "Medical Device Representative",
    },
    CategoryProfile {
        category: FormCategory::Kam,
        id: "kam",
        display_name: "Key Account Management",
        default_role: "Key Account Manager",
    },
    CategoryProfile {
        category: FormCategory::ConsumerHealth,
        id: "consumer_health",
        display_name: "Consumer Health",
        default_role: "Consumer Health Representative",
    },
    CategoryProfile {
        category: FormCategory::AnimalHealth,
        id: "animal_health",
        display_name: "Animal Health",
        default_role: "Animal Health Representative",
    },
    CategoryProfile {
        category: FormCategory::Contact,
        id: "contact",
        display_name: "General Contact",
        default_role: "General Inquiry",
    },
    CategoryProfile {
        category: FormCategory::RoiCalculator,
        id: "roi_calculator",
        display_name: "ROI Calculator",
        default_role: "ROI Calculator Lead",
    },
    CategoryProfile {
        category: FormCategory::General,
        id: "general",
        display_name: "General Inquiry",
        default_role: "Website Visitor",
    },
];

impl FormCategory {
    pub const ALL: [FormCategory; 9] = [
        FormCategory::PharmaReps,
        FormCategory::Msl,
        FormCategory::MedDevices,
        FormCategory::Kam,
        FormCategory::ConsumerHealth,
        FormCategory::AnimalHealth,
        FormCategory::Contact,
        FormCategory::RoiCalculator,
        FormCategory::General,
    ];

    pub fn profile(self) -> &'static CategoryProfile {
        // PROFILES is declared in the same order as the enum.
        &PROFILES[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        self.profile().id
    }

    pub fn display_name(self) -> &'static str {
        self.profile().display_name
    }

    pub fn default_role(self) -> &'static str {
        self.profile().default_role
    }
}

impl fmt::Display for FormCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PROFILES
            .iter()
            .find(|p| p.id == s)
            .map(|p| p.category)
            .ok_or_else(|| format!("Unknown form category: {}", s))
    }
}

/// Static facts about a form, known when it is registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormIdentity {
    pub id: Option<String>,
    /// The form sits inside the page's `#contact` section.
    pub in_contact_section: bool,
    /// The form hosts the ROI calculator widget.
    pub has_roi_calculator: bool,
    /// The form has separate first name, last name and role inputs.
    pub has_split_name_and_role: bool,
}

impl FormIdentity {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Resolves the category. Id fragments win over page placement.
    pub fn classify(&self) -> FormCategory {
        const ID_FRAGMENTS: [(&str, FormCategory); 6] = [
            ("pharma", FormCategory::PharmaReps),
            ("msl", FormCategory::Msl),
            ("medDevice", FormCategory::MedDevices),
            ("kam", FormCategory::Kam),
            ("consumerHealth", FormCategory::ConsumerHealth),
            ("animalHealth", FormCategory::AnimalHealth),
        ];

        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            if let Some((_, category)) = ID_FRAGMENTS.iter().find(|(frag, _)| id.contains(frag)) {
                return *category;
            }
        }

        if self.in_contact_section {
            FormCategory::Contact
        } else if self.has_roi_calculator {
            FormCategory::RoiCalculator
        } else if self.has_split_name_and_role {
            FormCategory::Contact
        } else {
            FormCategory::General
        }
    }
}
