use regex::Regex;

use crate::detect::CapabilityRegistry;

/// Maps a user-agent string to device classes.
///
/// Implementations are stateless with respect to the request so one
/// instance can serve concurrent requests; per-request state lives in
/// [`DeviceDetector`].
pub trait DeviceClassifier: Send + Sync {
    fn is_mobile(&self, user_agent: &str) -> bool;

    fn is_tablet(&self, user_agent: &str) -> bool;

    /// The named checks this classifier supports.
    fn capabilities(&self) -> &CapabilityRegistry;

    /// Version string of `property` (e.g. "iOS", "Chrome") if present.
    fn version(&self, _user_agent: &str, _property: &str) -> Option<String> {
        None
    }
}

/// A classifier bound to the user agent of one request.
pub struct DeviceDetector<'a> {
    classifier: &'a dyn DeviceClassifier,
    user_agent: String,
}

impl<'a> DeviceDetector<'a> {
    pub fn new(classifier: &'a dyn DeviceClassifier) -> Self {
        Self {
            classifier,
            user_agent: String::new(),
        }
    }

    pub fn set_user_agent(&mut self, user_agent: Option<&str>) {
        self.user_agent = user_agent.unwrap_or_default().to_owned();
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn is_mobile(&self) -> bool {
        self.classifier.is_mobile(&self.user_agent)
    }

    pub fn is_tablet(&self) -> bool {
        self.classifier.is_tablet(&self.user_agent)
    }

    /// Named capability check; unknown names are `false`.
    pub fn is(&self, name: &str) -> bool {
        self.classifier
            .capabilities()
            .classify(name, &self.user_agent)
            .unwrap_or(false)
    }

    pub fn version(&self, property: &str) -> Option<String> {
        self.classifier.version(&self.user_agent, property)
    }

    pub fn capability_names(&self) -> impl Iterator<Item = &'a str> {
        let classifier: &'a dyn DeviceClassifier = self.classifier;
        classifier.capabilities().names()
    }
}

const PHONE_RULES: &[(&str, &str)] = &[
    ("iPhone", r"\biPhone\b|\biPod\b"),
    ("BlackBerry", r"BlackBerry|\bBB10\b"),
    ("WindowsPhone", r"Windows Phone|IEMobile|Windows CE"),
    ("AndroidPhone", r"Android.*\bMobile\b"),
    ("GenericPhone", r"Mobile Safari|Opera Mini|Opera Mobi|\bMobi\b|Fennec|NetFront|Symbian"),
];

const TABLET_RULES: &[(&str, &str)] = &[
    ("iPad", r"\biPad\b"),
    ("Kindle", r"\bKindle\b|\bSilk/|\bKF[A-Z]{2,4}\b"),
    ("SamsungTablet", r"SAMSUNG.*Tablet|\bSM-T\d{3}|\bGT-P\d{4}"),
    ("NexusTablet", r"Nexus 7|Nexus 9|Nexus 10"),
];

const OS_RULES: &[(&str, &str)] = &[
    ("iOS", r"\biPhone.*Mobile|\biPod|\biPad|AppleCoreMedia"),
    ("AndroidOS", r"Android"),
    ("BlackBerryOS", r"BlackBerry|\bBB10\b|RIM Tablet OS"),
    ("WindowsPhoneOS", r"Windows Phone|Windows CE"),
];

const BROWSER_RULES: &[(&str, &str)] = &[
    ("Chrome", r"\bCrMo\b|CriOS|Chrome/"),
    ("Firefox", r"Firefox/|FxiOS"),
    ("Edge", r"\bEdg/|EdgiOS|EdgA/"),
    ("Opera", r"Opera|OPR/|Coast/"),
    ("Safari", r"Version/[\d.]+.*Safari/"),
];

const VERSION_RULES: &[(&str, &str)] = &[
    ("iOS", r"\bOS (\d+(?:_\d+)*)"),
    ("AndroidOS", r"Android (\d+(?:\.\d+)*)"),
    ("Android", r"Android (\d+(?:\.\d+)*)"),
    ("Chrome", r"(?:Chrome|CriOS|CrMo)/(\d+(?:\.\d+)*)"),
    ("Firefox", r"(?:Firefox|FxiOS)/(\d+(?:\.\d+)*)"),
    ("Edge", r"(?:Edg|EdgiOS|EdgA)/(\d+(?:\.\d+)*)"),
    ("Safari", r"Version/(\d+(?:\.\d+)*)"),
    ("Opera", r"(?:OPR|Version)/(\d+(?:\.\d+)*)"),
];

/// A small pattern-table classifier, enough to run without an external
/// device database.
pub struct KeywordClassifier {
    phones: Vec<&'static str>,
    tablets: Vec<&'static str>,
    versions: Vec<(String, Regex)>,
    registry: CapabilityRegistry,
}

impl KeywordClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        let mut registry = CapabilityRegistry::new();

        for &(name, pattern) in PHONE_RULES
            .iter()
            .chain(TABLET_RULES)
            .chain(OS_RULES)
            .chain(BROWSER_RULES)
        {
            let re = Regex::new(pattern)?;
            registry.register(name, move |ua| re.is_match(ua));
        }

        // Android without the "Mobile" token is a tablet.
        let android = Regex::new(r"Android")?;
        let mobile = Regex::new(r"\bMobile\b")?;
        registry.register("AndroidTablet", move |ua| {
            android.is_match(ua) && !mobile.is_match(ua)
        });

        // "Tablet PC" is a desktop.
        let tablet = Regex::new(r"\bTablet\b|\bTab\b")?;
        registry.register("GenericTablet", move |ua| {
            tablet.is_match(ua) && !ua.contains("Tablet PC")
        });

        let versions = VERSION_RULES
            .iter()
            .map(|&(name, pattern)| Ok((name.to_ascii_lowercase(), Regex::new(pattern)?)))
            .collect::<Result<_, regex::Error>>()?;

        Ok(Self {
            phones: PHONE_RULES.iter().map(|&(name, _)| name).collect(),
            tablets: TABLET_RULES
                .iter()
                .map(|&(name, _)| name)
                .chain(["AndroidTablet", "GenericTablet"])
                .collect(),
            versions,
            registry,
        })
    }

    fn matches_any(&self, names: &[&str], user_agent: &str) -> bool {
        names
            .iter()
            .any(|name| self.registry.classify(name, user_agent).unwrap_or(false))
    }
}

impl DeviceClassifier for KeywordClassifier {
    /// Tablets count as mobile devices.
    fn is_mobile(&self, user_agent: &str) -> bool {
        self.is_tablet(user_agent) || self.matches_any(&self.phones, user_agent)
    }

    fn is_tablet(&self, user_agent: &str) -> bool {
        self.matches_any(&self.tablets, user_agent)
    }

    fn capabilities(&self) -> &CapabilityRegistry {
        &self.registry
    }

    fn version(&self, user_agent: &str, property: &str) -> Option<String> {
        let property = property.to_ascii_lowercase();
        self.versions
            .iter()
            .filter(|(name, _)| *name == property)
            .find_map(|(_, re)| re.captures(user_agent))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().replace('_', "."))
    }
}
