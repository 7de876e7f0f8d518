//! Report prompt construction.
//!
//! One structured prompt per request: patient details, the diagnosis, and an
//! instruction to produce five named sections with age-tiered lifestyle
//! guidance. Both age branches are stated explicitly so the model tailors the
//! advice without a second round trip.

use crate::models::{DiagnosisLabel, PatientInfo};

/// Build the diagnostic-report prompt for the generative-text service.
pub fn build_report_prompt(patient: &PatientInfo, label: DiagnosisLabel) -> String {
    format!(
        "You are a medical assistant writing part of an official ECG diagnostic report \
for a real patient.\n\
\n\
Patient Details:\n\
- Name: {name}\n\
- Age: {age}\n\
- Gender: {gender}\n\
\n\
Diagnosis: {label}\n\
\n\
Provide the following sections using real content only (no placeholders, no generic \
templates):\n\
\n\
1. **Condition Summary**: a concise, informative definition of the condition.\n\
2. **Key Symptoms**: a bullet list of symptoms typically observed with this condition.\n\
3. **Causes and Risk Factors**: a bullet list of likely causes and contributing factors.\n\
4. **Recommended Actions**: clinical advice on next steps (tests, referrals, medications).\n\
5. **Lifestyle Advice**: preventive or supportive lifestyle guidance, tailored to the \
patient's age:\n\
   - If the patient is young (under 30), suggest age-appropriate preventive care, habits, \
and early interventions.\n\
   - If the patient is elderly (over 60), include advice on managing comorbidities, \
mobility, diet, and regular monitoring.\n\
\n\
Use a clear, professional tone. Do not use placeholders like \"[Patient Name]\" or \
\"[Date]\". This is a real diagnostic report intended for the patient named above.",
        name = patient.name,
        age = patient.age,
        gender = patient.gender,
        label = label,
    )
}
