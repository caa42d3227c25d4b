//! プロンプト生成モジュール
//!
//! クエリ一覧（指標付き）とブランド/業種から、
//! 検索意図の発見を依頼するプロンプトを組み立てる。
//! LLMへの指示文はフランス語（出力JSONのキーもフランス語）。

use crate::types::QueryRow;

/// プロンプトに載せる最大行数
pub const MAX_PROMPT_ROWS: usize = 100;

/// 検索意図解析プロンプト生成
///
/// # Arguments
/// * `queries` - 取り込んだ全クエリ（先頭MAX_PROMPT_ROWS件のみ掲載）
/// * `brand` - ブランド名（未指定・空なら「non spécifiée」）
/// * `sector` - 業種（未指定・空なら「non spécifié」）
///
/// # Returns
/// `intentions` / `patterns_linguistiques` / `insights` を持つJSONを要求するプロンプト
pub fn build_analysis_prompt(queries: &[QueryRow], brand: Option<&str>, sector: Option<&str>) -> String {
    let brand = brand.filter(|b| !b.is_empty()).unwrap_or("non spécifiée");
    let sector = sector.filter(|s| !s.is_empty()).unwrap_or("non spécifié");
    let total = queries.len();

    let data = queries
        .iter()
        .take(MAX_PROMPT_ROWS)
        .map(format_query_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Tu es un consultant SEO senior spécialisé dans l'analyse d'intentions de recherche.

CONTEXTE
- Marque : {brand}
- Secteur : {sector}
- Dataset : {total} requêtes issues de Google Search Console

MISSION
Analyse ces requêtes SANS utiliser de catégories prédéfinies. Identifie les PATTERNS RÉELS et les intentions CONCRÈTES des utilisateurs.

DONNÉES
{data}

ANALYSE REQUISE

1. **INTENTIONS DÉCOUVERTES** (3-6 intentions)
   Pour chaque intention identifiée :
   - nom : Nom court et descriptif (max 4 mots)
   - description : Ce que cherche VRAIMENT l'utilisateur
   - volume : Nombre de requêtes dans ce pattern
   - exemples : 3-5 requêtes typiques
   - signal_linguistique : Pattern de mots récurrent (ex: "comment", "prix", "vs", "2024")
   - ctr_moyen : CTR moyen de ces requêtes
   - position_moyenne : Position moyenne

2. **PATTERNS LINGUISTIQUES**
   - Mots récurrents significatifs
   - Structures de questions
   - Modificateurs temporels (2024, 2025)
   - Termes comparatifs (vs, ou, meilleur)

3. **INSIGHTS STRATÉGIQUES** (DÉTAILLÉS ET ACTIONNABLES)
   - biggest_opportunity : Décris EN DÉTAIL (2-3 phrases minimum) l'opportunité principale avec des EXEMPLES CONCRETS de requêtes et des CHIFFRES précis (volume, position, CTR). Explique POURQUOI c'est une opportunité et COMMENT la saisir.
   - biggest_friction : Décris EN DÉTAIL (2-3 phrases minimum) la friction principale avec des EXEMPLES CONCRETS de requêtes et des CHIFFRES précis. Explique POURQUOI c'est une friction et COMMENT la résoudre.
   - quick_win : Décris EN DÉTAIL (2-3 phrases minimum) une action rapide et concrète à mettre en place IMMÉDIATEMENT, avec des EXEMPLES précis de requêtes concernées et l'impact attendu.

CONTRAINTES IMPORTANTES :
- NE JAMAIS recommander de capitaliser sur des fautes d'orthographe (ex: "look academy" vs "lock academy") - c'est une pratique black-hat interdite
- NE JAMAIS suggérer de créer des URLs spécifiques (ex: "/escape-game-paris-2-joueurs") sans savoir si elles existent déjà - reste sur des recommandations stratégiques de haut niveau
- Privilégier les recommandations WHITE-HAT : optimisation de contenu existant, amélioration de la pertinence, structure de l'information
- Les insights doivent être RICHES, DÉTAILLÉS et contenir des DONNÉES CHIFFRÉES issues de l'analyse (exemples de requêtes, volumes, positions, CTR)

FORMAT JSON STRICT :
{{
  "intentions": [
    {{
      "nom": "string",
      "description": "string",
      "volume": number,
      "exemples": ["string"],
      "signal_linguistique": "string",
      "ctr_moyen": number,
      "position_moyenne": number
    }}
  ],
  "patterns_linguistiques": {{
    "mots_recurrents": ["string"],
    "structures_questions": ["string"],
    "modificateurs_temporels": ["string"],
    "termes_comparatifs": ["string"]
  }},
  "insights": {{
    "biggest_opportunity": "string (2-3 phrases détaillées avec exemples et chiffres)",
    "biggest_friction": "string (2-3 phrases détaillées avec exemples et chiffres)",
    "quick_win": "string (2-3 phrases détaillées avec action concrète)"
  }}
}}"#
    )
}

/// 1行分: `"クエリ" | Pos: 3.0 | CTR: 10.0% | Clics: 10`
fn format_query_line(q: &QueryRow) -> String {
    format!(
        "\"{}\" | Pos: {:.1} | CTR: {:.1}% | Clics: {}",
        q.query,
        q.position,
        q.ctr * 100.0,
        q.clicks
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(query: &str, position: f64, ctr: f64, clicks: u64) -> QueryRow {
        QueryRow {
            query: query.to_string(),
            clicks,
            impressions: 100,
            ctr,
            position,
        }
    }

    #[test]
    fn test_prompt_contains_context_and_rows() {
        let queries = vec![row("buy shoes online", 3.0, 0.1, 10)];
        let prompt = build_analysis_prompt(&queries, Some("ShoeCo"), Some("retail"));

        assert!(prompt.contains("- Marque : ShoeCo"));
        assert!(prompt.contains("- Secteur : retail"));
        assert!(prompt.contains("- Dataset : 1 requêtes"));
        assert!(prompt.contains("\"buy shoes online\" | Pos: 3.0 | CTR: 10.0% | Clics: 10"));
    }

    #[test]
    fn test_prompt_defaults_for_missing_context() {
        let prompt = build_analysis_prompt(&[], None, Some(""));
        assert!(prompt.contains("- Marque : non spécifiée"));
        assert!(prompt.contains("- Secteur : non spécifié"));
        assert!(prompt.contains("- Dataset : 0 requêtes"));
    }

    #[test]
    fn test_prompt_limits_rows_but_reports_total() {
        let queries: Vec<QueryRow> = (0..150)
            .map(|i| row(&format!("query number {}", i), 5.0, 0.02, 1))
            .collect();
        let prompt = build_analysis_prompt(&queries, None, None);

        assert!(prompt.contains("- Dataset : 150 requêtes"));
        assert!(prompt.contains("\"query number 99\""));
        assert!(!prompt.contains("\"query number 100\""));
        assert_eq!(prompt.matches("| Pos: ").count(), MAX_PROMPT_ROWS);
    }

    #[test]
    fn test_prompt_requests_json_schema_and_guardrails() {
        let prompt = build_analysis_prompt(&[], None, None);
        assert!(prompt.contains("\"intentions\": ["));
        assert!(prompt.contains("\"patterns_linguistiques\": {"));
        assert!(prompt.contains("\"insights\": {"));
        assert!(prompt.contains("\"signal_linguistique\": \"string\""));
        assert!(prompt.contains("fautes d'orthographe"));
        assert!(prompt.contains("URLs spécifiques"));
    }

    #[test]
    fn test_format_query_line_rounding() {
        let line = format_query_line(&row("a", 8.04, 0.0253, 2));
        assert_eq!(line, "\"a\" | Pos: 8.0 | CTR: 2.5% | Clics: 2");
    }
}
