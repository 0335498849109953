use std::collections::HashSet;

/// Known skill keywords, in display casing.
pub const SKILL_KEYWORDS: &[&str] = &[
    // Languages
    "Python",
    "Java",
    "JavaScript",
    "C++",
    "C#",
    "PHP",
    "Ruby",
    "Go",
    "Swift",
    // Frameworks
    "Django",
    "Flask",
    "React",
    "Angular",
    "Vue",
    "Spring",
    "Laravel",
    // Databases
    "SQL",
    "MySQL",
    "PostgreSQL",
    "MongoDB",
    "Oracle",
    "Redis",
    // Tools
    "Git",
    "Docker",
    "Kubernetes",
    "AWS",
    "Azure",
    "Jenkins",
    // Data science
    "Machine Learning",
    "Deep Learning",
    "TensorFlow",
    "PyTorch",
    "Pandas",
    "NumPy",
    // Other
    "Excel",
    "PowerBI",
    "Tableau",
    "SEO",
    "Marketing",
    "Agile",
    "Scrum",
];

/// Returns every keyword contained (case-insensitively, as a plain substring)
/// in `text`. A keyword inside a longer word still counts: "Pythonic" matches
/// "Python" and "Java" matches inside "JavaScript".
pub fn match_skills(text: &str) -> HashSet<&'static str> {
    let lowered = text.to_lowercase();
    SKILL_KEYWORDS
        .iter()
        .copied()
        .filter(|skill| lowered.contains(&skill.to_lowercase()))
        .collect()
}

/// Matched skills in lexicographic order, for display.
pub fn sorted_skills(text: &str) -> Vec<&'static str> {
    let mut skills: Vec<_> = match_skills(text).into_iter().collect();
    skills.sort_unstable();
    skills
}
