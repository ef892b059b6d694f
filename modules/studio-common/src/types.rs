pub use crate::choice::normalize_choice;

// --- Contact form choices ---

choice_enum! {
    /// What the visitor says they are contacting us about.
    pub enum Subject {
        General => "general" | "general-inquiry",
        Project => "project" | "project-request",
        Consultation => "consultation",
        Quote => "quote",
        Partnership => "partnership",
        Career => "career",
        Support => "support",
        Other => "other",
    }
}

choice_enum! {
    pub enum BudgetTier {
        Under10k => "under-10k" | "<10k",
        From10kTo25k => "10k-25k",
        From25kTo50k => "25k-50k",
        From50kTo100k => "50k-100k" | "50-100k",
        From100kTo250k => "100k-250k",
        Over250k => "250k+" | "250k-plus",
        NotSure => "not-sure" | "unsure",
    }
}

impl BudgetTier {
    /// Tiers in increasing size. `NotSure` is not part of the order.
    pub const ORDERED: &'static [BudgetTier] = &[
        BudgetTier::Under10k,
        BudgetTier::From10kTo25k,
        BudgetTier::From25kTo50k,
        BudgetTier::From50kTo100k,
        BudgetTier::From100kTo250k,
        BudgetTier::Over250k,
    ];
}

choice_enum! {
    pub enum Timeline {
        Asap => "asap" | "immediately",
        OneToThreeMonths => "1-3-months",
        ThreeToSixMonths => "3-6-months",
        SixToTwelveMonths => "6-12-months",
        OverTwelveMonths => "12-plus-months" | "12+-months" | "12+months",
        Flexible => "flexible",
    }
}

impl Timeline {
    /// Timelines from most to least urgent. `Flexible` is not part of the order.
    pub const ORDERED: &'static [Timeline] = &[
        Timeline::Asap,
        Timeline::OneToThreeMonths,
        Timeline::ThreeToSixMonths,
        Timeline::SixToTwelveMonths,
        Timeline::OverTwelveMonths,
    ];
}

choice_enum! {
    pub enum TeamSize {
        Solo => "solo" | "1",
        Small => "2-10",
        Medium => "11-50",
        Large => "50+" | "50-plus",
    }
}

impl TeamSize {
    pub const ORDERED: &'static [TeamSize] =
        &[TeamSize::Solo, TeamSize::Small, TeamSize::Medium, TeamSize::Large];
}

choice_enum! {
    pub enum Industry {
        Saas => "saas",
        Fintech => "fintech" | "finance",
        Healthcare => "healthcare",
        Ecommerce => "ecommerce" | "e-commerce",
        Manufacturing => "manufacturing",
        RealEstate => "real-estate",
        Education => "education",
        Consulting => "consulting",
        Nonprofit => "nonprofit" | "non-profit",
        Other => "other",
    }
}

choice_enum! {
    /// Self-reported urgency on the contact form.
    pub enum Urgency {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical" | "urgent",
    }
}

// --- Lead pipelines ---

choice_enum! {
    /// Sales pipeline stage of a contact submission.
    pub enum LeadStatus {
        New => "new",
        Contacted => "contacted",
        Qualified => "qualified",
        Proposal => "proposal" | "proposal-sent" | "negotiating",
        Won => "won" | "converted",
        Lost => "lost",
    }
}

impl LeadStatus {
    pub fn is_open(&self) -> bool {
        !matches!(self, LeadStatus::Won | LeadStatus::Lost)
    }

    /// Position along the forward pipeline; terminal states have none.
    fn stage(&self) -> Option<u8> {
        match self {
            LeadStatus::New => Some(0),
            LeadStatus::Contacted => Some(1),
            LeadStatus::Qualified => Some(2),
            LeadStatus::Proposal => Some(3),
            LeadStatus::Won | LeadStatus::Lost => None,
        }
    }

    /// Leads only move forward; any open lead can be closed as won or lost.
    pub fn can_transition_to(&self, to: LeadStatus) -> bool {
        if !self.is_open() {
            return false;
        }
        match (self.stage(), to.stage()) {
            (Some(from), Some(next)) => next > from,
            (_, None) => true,
            (None, _) => false,
        }
    }
}

choice_enum! {
    pub enum MagnetStatus {
        New => "new",
        Downloaded => "downloaded",
        Engaged => "engaged",
        Qualified => "qualified",
        Contacted => "contacted",
        Converted => "converted",
        Lost => "lost",
    }
}

impl MagnetStatus {
    /// Position along the nurture funnel; `Converted` and `Lost` are terminal.
    pub fn stage(&self) -> Option<u8> {
        match self {
            MagnetStatus::New => Some(0),
            MagnetStatus::Downloaded => Some(1),
            MagnetStatus::Engaged => Some(2),
            MagnetStatus::Qualified => Some(3),
            MagnetStatus::Contacted => Some(4),
            MagnetStatus::Converted | MagnetStatus::Lost => None,
        }
    }

    /// `next` when it lies further along the funnel than `self`, otherwise `self`.
    pub fn advance_to(self, next: MagnetStatus) -> MagnetStatus {
        match (self.stage(), next.stage()) {
            (Some(from), Some(to)) if to > from => next,
            _ => self,
        }
    }
}

choice_enum! {
    pub enum LeadMagnetKind {
        DjangoSaasChecklist => "django-saas-checklist",
        StartupGuide => "startup-guide",
        TechStackGuide => "tech-stack-guide",
        FundingGuide => "funding-guide",
    }
}

choice_enum! {
    pub enum LeadSource {
        Website => "website",
        SocialMedia => "social-media",
        Email => "email",
        Referral => "referral",
        Search => "search",
        Other => "other",
    }
}

// --- Team ---

choice_enum! {
    pub enum TeamRole {
        Ceo => "ceo",
        Cto => "cto",
        Developer => "developer",
        Designer => "designer",
        Devops => "devops" | "devops-engineer",
        ProjectManager => "pm" | "project-manager",
        Qa => "qa" | "qa-engineer",
        Intern => "intern",
    }
}

choice_enum! {
    #[derive(Default)]
    pub enum Availability {
        #[default]
        Available => "available",
        Busy => "busy",
        Unavailable => "unavailable",
        OnLeave => "on-leave",
    }
}

// --- Engagement ---

choice_enum! {
    pub enum SharePlatform {
        Twitter => "twitter" | "x",
        Linkedin => "linkedin",
        Facebook => "facebook",
        Reddit => "reddit",
        Email => "email",
        CopyLink => "copy-link",
    }
}

choice_enum! {
    #[derive(Default)]
    pub enum Difficulty {
        #[default]
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
    }
}
