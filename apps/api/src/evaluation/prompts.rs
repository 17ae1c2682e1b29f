// Prompt constants for the Evaluation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Rationale prompt. Replace every `{...}` placeholder before sending.
pub const RATIONALE_PROMPT_TEMPLATE: &str = r#"Analyze this candidate evaluation as a senior recruiter and write a professional assessment.

JOB REQUIREMENTS:
- Position: {job_title}
- Required Experience: {required_experience}
- Key Skills: {job_skills}
- Tools: {job_tools}

CANDIDATE PROFILE:
- Name: {candidate_name}
- Total Experience: {candidate_experience}
- Education: {candidate_education}
- Key Skills: {candidate_skills}

EVALUATION SCORES:
{score_lines}

OVERALL SCORE: {overall}%

Write a 4-5 sentence analysis that:
1. Evaluates overall fit for the role
2. Highlights the key matching strengths
3. Identifies critical gaps or areas of concern
4. Ends with one recommendation: Strong Hire, Moderate Fit or Not Recommended

Be direct and focus on job-relevant factors. Plain prose only: no markdown, no code blocks, no JSON."#;

/// Rubric weighting prompt. Replace `{job_title}` and `{job_json}` before sending.
pub const RUBRIC_PROMPT_TEMPLATE: &str = r#"You are an expert HR analyst. Tune the evaluation weights for the job below.

BASE WEIGHTS (adjust to the job):
- skills: 25 (technical skills)
- tools: 25 (tools and technologies)
- experience: 20 (work experience)
- education: 5 (educational background)
- projects: 15 (project experience)
- certifications: 5 (certifications and courses)
- profile_quality: 5 (LinkedIn/GitHub/role fit)

ADJUSTMENT RULES:
1. Education not mandatory or not mentioned: education 0-3, redistribute the rest
2. Certifications required: raise certifications
3. Role for freshers: raise education and projects, lower experience
4. Senior role: raise experience significantly
5. Projects explicitly required: raise projects
6. Specific tools are critical: raise tools
7. Integer weights only, summing to exactly 100

JOB: {job_title}
{job_json}

Return this JSON shape:
{"weights": {"skills": 25, "tools": 25, "experience": 20, "education": 5, "projects": 15, "certifications": 5, "profile_quality": 5}, "reasoning": "one or two sentences on why the weights were adjusted"}"#;
