//! Guided question catalog: country → ordered topics → ordered questions.

use indexmap::{IndexMap, IndexSet};
use pris_core::{AppError, AppResult};
use std::path::Path;

type TopicMap = IndexMap<String, Vec<String>>;

const BUILTIN: &[(&str, &[(&str, &[&str])])] = &[
    (
        "Korea, Republic of",
        &[
            (
                "Nuclear Policy Framework 📋",
                &[
                    "How does Korea's nuclear energy policy align with its carbon neutrality goals?",
                    "What is Korea's position on nuclear plant life extension and new builds?",
                    "How does Korea integrate nuclear with renewable energy sources?",
                ],
            ),
            (
                "Technology Leadership 🔬",
                &[
                    "What are the key features and deployment status of the APR-1400?",
                    "How is Korea advancing its SMR development through SMART reactor?",
                    "What is Korea's nuclear technology export strategy and achievements?",
                ],
            ),
            (
                "Safety & Regulation 🛡️",
                &[
                    "How does KINS implement its regulatory oversight functions?",
                    "What are the key safety features in Korean nuclear designs?",
                    "How does Korea manage its nuclear emergency preparedness system?",
                ],
            ),
            (
                "Fuel Cycle Management ⚛️",
                &[
                    "What is Korea's spent fuel management policy and infrastructure?",
                    "How does Korea ensure nuclear fuel supply security?",
                    "What R&D is being conducted for advanced fuel technologies?",
                ],
            ),
        ],
    ),
    (
        "United Arab Emirates",
        &[
            (
                "Barakah Project 🏗️",
                &[
                    "What is the current status of the Barakah Nuclear Power Plant?",
                    "How is the APR-1400 technology being implemented in UAE?",
                    "What are the key milestones in the Barakah construction timeline?",
                ],
            ),
            (
                "Regulatory Framework 📊",
                &[
                    "How does FANR regulate nuclear activities in UAE?",
                    "What safety standards are implemented at Barakah?",
                    "How is nuclear emergency preparedness managed?",
                ],
            ),
            (
                "Capacity Building 👥",
                &[
                    "How is UAE developing its nuclear workforce?",
                    "What international partnerships support UAE's nuclear program?",
                    "What is the role of ENEC in program implementation?",
                ],
            ),
        ],
    ),
    (
        "Egypt",
        &[
            (
                "El Dabaa Project 🏭",
                &[
                    "What is the scope and timeline of the El Dabaa NPP project?",
                    "How is Egypt cooperating with Russia on the VVER technology?",
                    "What are the key project milestones and challenges?",
                ],
            ),
            (
                "Nuclear Infrastructure 🔧",
                &[
                    "How is Egypt establishing its nuclear regulatory framework?",
                    "What measures are in place for nuclear safety and security?",
                    "How is Egypt developing its nuclear workforce?",
                ],
            ),
            (
                "Energy Planning ⚡",
                &[
                    "How does nuclear fit into Egypt's energy strategy?",
                    "What are the economic and environmental benefits expected?",
                    "How will El Dabaa impact regional energy security?",
                ],
            ),
        ],
    ),
    (
        "China",
        &[
            (
                "Expansion Program 📈",
                &[
                    "What is China's nuclear capacity target for 2025/2030?",
                    "How many units are currently under construction?",
                    "What new sites are being developed for nuclear power?",
                ],
            ),
            (
                "Technology Development 🔬",
                &[
                    "What is the status of Hualong One deployment?",
                    "How is China developing its SMR technology?",
                    "What advanced reactor designs is China pursuing?",
                ],
            ),
            (
                "Industrial Capability 🏭",
                &[
                    "How has China localized nuclear technology?",
                    "What is China's nuclear export strategy?",
                    "How is China's nuclear supply chain organized?",
                ],
            ),
        ],
    ),
    (
        "United States of America",
        &[
            (
                "Fleet Management 🏢",
                &[
                    "What is the status of nuclear plant life extensions?",
                    "How is the existing fleet's performance being optimized?",
                    "What regulatory changes support continued operation?",
                ],
            ),
            (
                "Advanced Reactors 🔬",
                &[
                    "What is the progress on SMR deployment?",
                    "How does NRC regulate new reactor technologies?",
                    "What advanced reactor designs are being developed?",
                ],
            ),
            (
                "Policy Support 📜",
                &[
                    "How do federal policies support nuclear energy?",
                    "What incentives exist for new nuclear projects?",
                    "How is nuclear waste management being addressed?",
                ],
            ),
        ],
    ),
    (
        "Japan",
        &[
            (
                "Restart Program 🔄",
                &[
                    "What is the status of nuclear plant restarts?",
                    "How have safety requirements been enhanced post-Fukushima?",
                    "What is the timeline for remaining restart reviews?",
                ],
            ),
            (
                "Safety Enhancement 🛡️",
                &[
                    "What new safety measures have been implemented?",
                    "How has the regulatory framework been strengthened?",
                    "What emergency preparedness improvements were made?",
                ],
            ),
            (
                "Energy Policy ⚡",
                &[
                    "What is nuclear's role in Japan's energy mix?",
                    "How does nuclear support decarbonization goals?",
                    "What is the policy on plant life extension?",
                ],
            ),
        ],
    ),
    (
        "Canada",
        &[
            (
                "CANDU Technology 🔬",
                &[
                    "How is the CANDU fleet being maintained and upgraded?",
                    "What life extension programs are in progress?",
                    "How is CANDU technology being exported?",
                ],
            ),
            (
                "SMR Leadership 🚀",
                &[
                    "What is Canada's SMR deployment roadmap?",
                    "How is regulatory framework adapting for SMRs?",
                    "What SMR designs are being developed?",
                ],
            ),
            (
                "Nuclear Innovation 💡",
                &[
                    "What R&D programs are prioritized?",
                    "How is nuclear supporting clean energy goals?",
                    "What new applications are being explored?",
                ],
            ),
        ],
    ),
];

/// Immutable guided question catalog, loaded once at startup.
///
/// Every question is unique within its country.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionCatalog {
    countries: IndexMap<String, TopicMap>,
}

impl QuestionCatalog {
    /// The reference catalog of seven countries.
    pub fn builtin() -> Self {
        let countries = BUILTIN
            .iter()
            .map(|(country, topics)| {
                let topics = topics
                    .iter()
                    .map(|(topic, questions)| {
                        (
                            topic.to_string(),
                            questions.iter().map(|q| q.to_string()).collect(),
                        )
                    })
                    .collect();
                (country.to_string(), topics)
            })
            .collect();

        Self { countries }
    }

    /// Build a catalog, rejecting duplicate questions within a country.
    pub fn from_map(countries: IndexMap<String, TopicMap>) -> AppResult<Self> {
        for (country, topics) in &countries {
            if country.trim().is_empty() {
                return Err(AppError::Config("Catalog contains an empty country name".to_string()));
            }

            let mut seen = IndexSet::new();
            for question in topics.values().flatten() {
                if !seen.insert(question.as_str()) {
                    return Err(AppError::Config(format!(
                        "Catalog question for {} appears more than once: {}",
                        country, question
                    )));
                }
            }
        }

        Ok(Self { countries })
    }

    /// Load a catalog override from YAML (`country: {topic: [questions]}`).
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read catalog {:?}: {}", path, e))
        })?;

        let countries: IndexMap<String, TopicMap> = serde_yaml::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse catalog {:?}: {}", path, e)))?;

        let catalog = Self::from_map(countries)?;
        tracing::info!(
            "Loaded question catalog from {:?} ({} countries)",
            path,
            catalog.countries.len()
        );
        Ok(catalog)
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.countries.contains_key(country)
    }

    /// Topics for a country in display order.
    pub fn topics(&self, country: &str) -> Option<&IndexMap<String, Vec<String>>> {
        self.countries.get(country)
    }

    /// All questions of a country, topic by topic.
    pub fn questions(&self, country: &str) -> Vec<&str> {
        self.topics(country)
            .map(|topics| topics.values().flatten().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Resolve a 1-based `topic.question` id such as `2.3`.
    pub fn pick(&self, country: &str, id: &str) -> AppResult<&str> {
        let (topic_no, question_no) = parse_pick(id)?;

        let topics = self
            .topics(country)
            .ok_or_else(|| AppError::Config(format!("No guided topics for country: {}", country)))?;

        let (_, questions) = topics.get_index(topic_no - 1).ok_or_else(|| {
            AppError::Config(format!(
                "Topic {} does not exist for {} ({} topics)",
                topic_no,
                country,
                topics.len()
            ))
        })?;

        questions
            .get(question_no - 1)
            .map(String::as_str)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "Question {} does not exist in topic {} ({} questions)",
                    question_no,
                    topic_no,
                    questions.len()
                ))
            })
    }
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn parse_pick(id: &str) -> AppResult<(usize, usize)> {
    let invalid = || AppError::Config(format!("Invalid question id '{}', expected TOPIC.QUESTION (e.g. 1.2)", id));

    let (topic, question) = id.trim().split_once('.').ok_or_else(invalid)?;
    let topic: usize = topic.parse().map_err(|_| invalid())?;
    let question: usize = question.parse().map_err(|_| invalid())?;

    if topic == 0 || question == 0 {
        return Err(invalid());
    }

    Ok((topic, question))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_shape() {
        let catalog = QuestionCatalog::builtin();
        let countries: Vec<&str> = catalog.countries().collect();

        assert_eq!(countries.len(), 7);
        assert_eq!(countries[0], "Korea, Republic of");
        assert_eq!(countries[6], "Canada");

        for country in &countries {
            let topics = catalog.topics(country).unwrap();
            assert!((3..=4).contains(&topics.len()), "{} has {} topics", country, topics.len());
            assert!(topics.values().all(|qs| qs.len() == 3));
        }
    }

    #[test]
    fn test_builtin_passes_validation() {
        let catalog = QuestionCatalog::builtin();
        assert_eq!(QuestionCatalog::from_map(catalog.countries.clone()).unwrap(), catalog);
    }

    #[test]
    fn test_questions_flatten_in_order() {
        let catalog = QuestionCatalog::builtin();
        let questions = catalog.questions("Canada");

        assert_eq!(questions.len(), 9);
        assert_eq!(questions[0], "How is the CANDU fleet being maintained and upgraded?");
        assert_eq!(questions[8], "What new applications are being explored?");
        assert!(catalog.questions("Atlantis").is_empty());
    }

    #[test]
    fn test_pick_by_id() {
        let catalog = QuestionCatalog::builtin();
        assert_eq!(
            catalog.pick("Japan", "1.1").unwrap(),
            "What is the status of nuclear plant restarts?"
        );
        assert_eq!(
            catalog.pick("Korea, Republic of", "4.3").unwrap(),
            "What R&D is being conducted for advanced fuel technologies?"
        );
    }

    #[test]
    fn test_pick_rejects_bad_ids() {
        let catalog = QuestionCatalog::builtin();
        for id in ["", "1", "0.1", "1.0", "a.b", "9.1", "1.9"] {
            assert!(catalog.pick("China", id).is_err(), "{} should be rejected", id);
        }
        assert!(catalog.pick("Atlantis", "1.1").is_err());
    }

    #[test]
    fn test_duplicate_question_rejected() {
        let mut topics = IndexMap::new();
        topics.insert("A".to_string(), vec!["Same?".to_string()]);
        topics.insert("B".to_string(), vec!["Same?".to_string()]);
        let mut countries = IndexMap::new();
        countries.insert("Japan".to_string(), topics);

        assert!(matches!(
            QuestionCatalog::from_map(countries),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_same_question_in_two_countries_allowed() {
        let mut countries = IndexMap::new();
        for country in ["Japan", "China"] {
            let mut topics = IndexMap::new();
            topics.insert("Outlook".to_string(), vec!["What comes next?".to_string()]);
            countries.insert(country.to_string(), topics);
        }
        assert!(QuestionCatalog::from_map(countries).is_ok());
    }

    #[test]
    fn test_load_yaml_keeps_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.yaml");
        fs::write(
            &path,
            r#"
Finland:
  "Onkalo Repository":
    - "When will Onkalo start operation?"
    - "How is spent fuel encapsulated?"
  "Olkiluoto 3":
    - "What delayed Olkiluoto 3?"
"#,
        )
        .unwrap();

        let catalog = QuestionCatalog::load(&path).unwrap();
        assert_eq!(catalog.countries().collect::<Vec<_>>(), vec!["Finland"]);
        assert_eq!(catalog.pick("Finland", "2.1").unwrap(), "What delayed Olkiluoto 3?");
    }

    #[test]
    fn test_load_invalid_yaml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.yaml");
        fs::write(&path, "Finland: [1, 2").unwrap();
        assert!(matches!(QuestionCatalog::load(&path), Err(AppError::Config(_))));
    }
}
