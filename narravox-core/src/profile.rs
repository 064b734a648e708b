//! Profile record types
//!
//! The structured profile supplied by the surrounding application each time
//! narration is requested. Field names mirror the profile page's data shape.

use serde::{Deserialize, Serialize};

/// One work-experience entry, ordered most recent first.
///
/// Dates are free-form strings as entered on the profile page; `end_date`
/// may be "Present" for a current position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub description: String,
}

impl Default for Experience {
    fn default() -> Self {
        Self {
            title: String::new(),
            company: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            location: String::new(),
            description: String::new(),
        }
    }
}

/// One education entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub start_year: String,
    pub end_year: String,
    pub description: String,
}

impl Default for Education {
    fn default() -> Self {
        Self {
            school: String::new(),
            degree: String::new(),
            field: String::new(),
            start_year: String::new(),
            end_year: String::new(),
            description: String::new(),
        }
    }
}

/// A complete profile record.
///
/// Immutable input to the narration subsystem; the caller owns it and passes
/// it by reference whenever a narration is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    pub name: String,
    pub headline: String,
    pub location: String,
    pub about: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub connections: u32,
    pub profile_views: u32,
    pub post_impressions: u32,

    /// Optional contact fields carried from the profile page.
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Default for ProfileRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            headline: String::new(),
            location: String::new(),
            about: String::new(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            connections: 0,
            profile_views: 0,
            post_impressions: 0,
            website: None,
            email: None,
            phone: None,
        }
    }
}

impl ProfileRecord {
    /// The stock demo record used by examples and tests.
    pub fn sample() -> Self {
        Self {
            name: "Alex Johnson".to_string(),
            headline: "Senior Software Engineer at TechCorp".to_string(),
            location: "San Francisco, California".to_string(),
            about: "Passionate software engineer with 8+ years of experience building \
                    scalable web applications. Specialized in React, Node.js, and cloud \
                    technologies. Previously worked at WebSolutions Inc where I led a \
                    team of 5 developers."
                .to_string(),
            experience: vec![
                Experience {
                    title: "Senior Software Engineer".to_string(),
                    company: "TechCorp".to_string(),
                    start_date: "2020-03".to_string(),
                    end_date: "Present".to_string(),
                    location: "San Francisco, CA".to_string(),
                    description: "Lead development of customer-facing web applications \
                                  using React and Node.js"
                        .to_string(),
                },
                Experience {
                    title: "Software Engineer".to_string(),
                    company: "WebSolutions Inc".to_string(),
                    start_date: "2017-06".to_string(),
                    end_date: "2020-02".to_string(),
                    location: "New York, NY".to_string(),
                    description: "Developed and maintained multiple client websites and \
                                  web applications"
                        .to_string(),
                },
            ],
            education: vec![
                Education {
                    school: "Stanford University".to_string(),
                    degree: "Master of Science".to_string(),
                    field: "Computer Science".to_string(),
                    start_year: "2015".to_string(),
                    end_year: "2017".to_string(),
                    description: "Specialized in Machine Learning and Web Technologies"
                        .to_string(),
                },
                Education {
                    school: "University of California, Berkeley".to_string(),
                    degree: "Bachelor of Science".to_string(),
                    field: "Computer Science".to_string(),
                    start_year: "2011".to_string(),
                    end_year: "2015".to_string(),
                    description: "Graduated Magna Cum Laude".to_string(),
                },
            ],
            skills: vec![
                "React".to_string(),
                "JavaScript".to_string(),
                "Node.js".to_string(),
                "TypeScript".to_string(),
                "AWS".to_string(),
                "MongoDB".to_string(),
                "Python".to_string(),
                "Docker".to_string(),
                "Kubernetes".to_string(),
                "GraphQL".to_string(),
            ],
            connections: 543,
            profile_views: 1287,
            post_impressions: 3256,
            website: Some("https://alexjohnson.dev".to_string()),
            email: Some("alex.johnson@example.com".to_string()),
            phone: Some("+1 (555) 123-4567".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_record_is_well_formed() {
        let profile = ProfileRecord::sample();
        assert_eq!(profile.experience.len(), 2);
        assert_eq!(profile.education.len(), 2);
        assert_eq!(profile.skills.len(), 10);
        assert!(profile.connections > 0);
    }

    #[test]
    fn profile_record_round_trips_through_json() {
        let profile = ProfileRecord::sample();
        let json = serde_json::to_string(&profile).unwrap();
        let back: ProfileRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(profile, back);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let profile: ProfileRecord =
            serde_json::from_str(r#"{"name": "Sam Lee"}"#).unwrap();
        assert_eq!(profile.name, "Sam Lee");
        assert!(profile.experience.is_empty());
        assert_eq!(profile.connections, 0);
        assert!(profile.website.is_none());
    }
}
