use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language used for default names, description templates and captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-BR")]
    PtBr,
}

impl Locale {
    pub fn default_recipient(&self) -> &'static str {
        match self {
            Locale::En => "Someone",
            Locale::PtBr => "Alguém",
        }
    }

    pub fn help_description(&self, name: &str) -> String {
        match self {
            Locale::En => format!("Help {name}"),
            Locale::PtBr => format!("Ajude {name}"),
        }
    }

    pub fn scanned_pix_caption(&self) -> &'static str {
        match self {
            Locale::En => "Scanned Pix QR code",
            Locale::PtBr => "QR Code Pix escaneado",
        }
    }

    pub fn pix_key_caption(&self, key: &str) -> String {
        match self {
            Locale::En => format!("Pix key: {key}"),
            Locale::PtBr => format!("Chave Pix: {key}"),
        }
    }

    pub fn available_for(&self) -> &'static str {
        match self {
            Locale::En => "Available for",
            Locale::PtBr => "Disponível por",
        }
    }

    pub fn html_lang(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtBr => "pt-BR",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" => Ok(Locale::En),
            "pt" | "pt-br" => Ok(Locale::PtBr),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}
