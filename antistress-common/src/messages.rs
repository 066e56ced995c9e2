//! User-facing message catalogs
//!
//! Every string a client can see is defined here. The Russian catalog keeps
//! the wording deployed clients and stored predictions already use, byte for
//! byte; do not edit it.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::worker::WorkerIdentity;
use crate::Error;

/// Language of user-facing messages and stress labels
///
/// Command line, environment and TOML all accept the same spellings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

/// Fixed failure messages, one per pipeline step that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    AddWorker,
    DeleteWorker,
    SaveFeatures,
    SavePrediction,
    Predict,
}

impl Locale {
    /// Readiness acknowledgment for `GET /`
    pub fn server_running(self) -> &'static str {
        match self {
            Locale::En => "server running",
            Locale::Ru => "Сервер запущен",
        }
    }

    pub fn worker_added(self, worker: &WorkerIdentity) -> String {
        match self {
            Locale::En => format!("{} {} successfully added", worker.first_name, worker.last_name),
            Locale::Ru => format!(
                "Работник {} {} был успешно добавлен",
                worker.first_name, worker.last_name
            ),
        }
    }

    pub fn worker_deleted(self, worker: &WorkerIdentity) -> String {
        match self {
            Locale::En => format!("{} {} successfully deleted", worker.first_name, worker.last_name),
            Locale::Ru => format!(
                "Работник {} {} был успешно удален",
                worker.first_name, worker.last_name
            ),
        }
    }

    pub fn failure(self, failure: Failure) -> &'static str {
        match (self, failure) {
            (Locale::En, Failure::AddWorker) => "Failed to add worker",
            (Locale::En, Failure::DeleteWorker) => "Failed to delete worker",
            (Locale::En, Failure::SaveFeatures) => "Failed to save worker features",
            (Locale::En, Failure::SavePrediction) => "Failed to save prediction",
            (Locale::En, Failure::Predict) => "Failed to predict stress level",
            (Locale::Ru, Failure::AddWorker) => "Не удалось добавить работника",
            (Locale::Ru, Failure::DeleteWorker) => "Не удалось удалить работника",
            (Locale::Ru, Failure::SaveFeatures) => "Не удалось сохранить показатели работника",
            (Locale::Ru, Failure::SavePrediction) => "Не удалось сохранить прогноз",
            (Locale::Ru, Failure::Predict) => "Не удалось определить уровень стресса",
        }
    }

    /// Stress labels indexed by classifier class
    pub fn stress_labels(self) -> [&'static str; 3] {
        match self {
            Locale::En => ["low stress level", "medium stress level", "high stress level"],
            Locale::Ru => [
                "Низкий уровень стресса",
                "Средний уровень стресса",
                "Высокий уровень стресса",
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "ru" | "russian" => Ok(Locale::Ru),
            other => Err(Error::Config(format!(
                "Unknown locale '{}' (expected 'en' or 'ru')",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
