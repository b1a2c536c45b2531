use crate::domain::model::NormalizedDomain;

const WWW_MARKER: &str = "www.";

/// 網域正規化：去頭尾空白 → 轉小寫 → 移除第一個出現的 `www.`。
///
/// The `www.` removal is a plain substring replacement of the leftmost
/// occurrence, not a prefix strip: `sub.www.example.com` becomes
/// `sub.example.com`. Total over all inputs; garbage in simply yields a
/// key that matches nothing.
pub fn normalize(raw: &str) -> NormalizedDomain {
    let lowered = raw.trim().to_lowercase();
    NormalizedDomain::new(lowered.replacen(WWW_MARKER, "", 1))
}
