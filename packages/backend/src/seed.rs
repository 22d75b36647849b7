//! Demo curriculum and learner
//!
//! Mathematics, class 12: five chapters, six concepts, a prerequisite edge
//! from linear equations to systems of equations and one reinforcement
//! node. Ids are fixed strings so reseeding is a no-op.

use sqlx::SqliteConnection;

use studemy_algo::Difficulty;
use studemy_algo::Difficulty::{Challenge, Easy, Hard, Medium};

use crate::db::operations::stats::now_iso;
use crate::db::DatabaseProxy;
use crate::services::curriculum::{CLASS_NAME, SUBJECT_NAME, SUBJECT_SLUG};

pub const DEMO_USER_ID: &str = "demo-student";
pub const DEMO_USER_EMAIL: &str = "demo@student.com";
pub const DEMO_USER_NAME: &str = "Demo Student";

const SUBJECT_ID: &str = "subject-mathematics";
const CLASS_ID: &str = "class-mathematics-12";

struct ConceptSeed {
    slug: &'static str,
    title: &'static str,
    description: &'static str,
    questions: &'static [(Difficulty, &'static str)],
}

struct ChapterSeed {
    order: i64,
    title: &'static str,
    concepts: &'static [ConceptSeed],
}

/// `(prerequisite slug, dependent slug)`
const RELATIONS: &[(&str, &str)] = &[("linear-equations", "systems-of-equations")];

/// `(concept slug, reinforcement slug)`
const REINFORCEMENTS: &[(&str, &str)] = &[("systems-of-equations", "matrices")];

const CHAPTERS: &[ChapterSeed] = &[
    ChapterSeed {
        order: 1,
        title: "Relations and Functions",
        concepts: &[ConceptSeed {
            slug: "relations-and-functions",
            title: "Relations and Functions",
            description: "Types of relations and functions, composition, invertibility.",
            questions: &[
                (Easy, "Let A = {1, 2, 3}. Write the relation R = {(a, b) : a + b = 4} in roster form."),
                (Easy, "Find the composition (g ∘ f)(x) and (f ∘ g)(x) where f(x) = x² and g(x) = x + 1. Are they equal?"),
                (Medium, "Check whether the relation R in Z given by R = {(a, b) : 2 divides (a - b)} is reflexive, symmetric, transitive."),
                (Medium, "Let f : R → R be defined by f(x) = 2x + 3. Show that f is one-one and onto, and hence find f⁻¹."),
                (Hard, "Show that R in A = {1, 2, 3, 4, 5} given by R = {(a, b) : |a - b| is even} is an equivalence relation."),
                (Hard, "Prove that the relation R on R given by a R b ⇔ a − b ∈ Z is an equivalence relation."),
                (Challenge, "Let f : R → R be defined as f(x) = 10x + 7. Find g : R → R such that g ∘ f = f ∘ g = I_R."),
                (Challenge, "Let f : N → N be defined by f(n) = n + 1. Is f onto? Is f one-one?"),
            ],
        }],
    },
    ChapterSeed {
        order: 2,
        title: "Linear Equations and Matrices",
        concepts: &[
            ConceptSeed {
                slug: "linear-equations",
                title: "Linear Equations",
                description: "Solve linear equations in one variable.",
                questions: &[
                    (Easy, "Solve for x: x + 3 = 7"),
                    (Easy, "Solve for x: 5x = 20"),
                    (Medium, "Solve for x: 2x - 5 = 9"),
                    (Medium, "Solve for x: 3x + 4 = 2x + 10"),
                    (Hard, "Solve for x: 3(x - 2) = 15"),
                    (Hard, "Solve for x: (x + 1)/2 = (x - 3)/4"),
                    (Challenge, "Solve for x: 4x + 7 = 3x - 5"),
                    (Challenge, "Solve for x: 2(3x - 1) - 3(2x + 1) = 5"),
                ],
            },
            ConceptSeed {
                slug: "systems-of-equations",
                title: "Systems of Equations",
                description: "Solve systems of linear equations.",
                questions: &[
                    (Easy, "Solve: x + y = 5, x - y = 1"),
                    (Easy, "Solve: 2x + y = 7, x - y = 2"),
                    (Medium, "Solve: 2x + 3y = 12, 4x - y = 5"),
                    (Medium, "Solve: 3x + 2y = 8, 2x + 3y = 7"),
                    (Hard, "Solve: x/2 + y/3 = 2, 2x - y = 5"),
                    (Hard, "Solve: 2x + 3y = 13, 5x - 4y = -2"),
                    (Challenge, "Solve: (x+y)/2 + (x-y)/3 = 4, (x+y)/3 + (x-y)/2 = 1"),
                ],
            },
        ],
    },
    ChapterSeed {
        order: 3,
        title: "Inverse Trigonometric Functions",
        concepts: &[ConceptSeed {
            slug: "inverse-trigonometric-functions",
            title: "Inverse Trigonometric Functions",
            description: "Principal values and properties of inverse trig functions.",
            questions: &[
                (Easy, "Find the principal value of sin⁻¹(1/2)."),
                (Easy, "Find the principal value of cos⁻¹(√3/2)."),
                (Medium, "Find the principal value of tan⁻¹(1)."),
                (Medium, "Find the value of tan(sin⁻¹(3/5))."),
                (Hard, "Prove: tan⁻¹(1/2) + tan⁻¹(1/3) = π/4."),
                (Hard, "If tan⁻¹ a + tan⁻¹ b = π/4, show that a + b = 1 − ab."),
                (Challenge, "Solve the equation: tan⁻¹(2x) − tan⁻¹(1 − x) = π/4."),
                (Challenge, "If cos⁻¹ x + cos⁻¹ y = π/3, show that x² + y² + xy = 3/4."),
            ],
        }],
    },
    ChapterSeed {
        order: 4,
        title: "Matrices",
        concepts: &[ConceptSeed {
            slug: "matrices",
            title: "Matrices",
            description: "Operations on matrices, transpose, symmetric and skew-symmetric.",
            questions: &[
                (Easy, "If A = [1 2; 3 4], find A + A'."),
                (Easy, "Show by an example that matrix multiplication is not commutative, i.e. AB ≠ BA in general."),
                (Medium, "If A is a 3×3 matrix such that |A| = 2, find |3A|."),
                (Medium, "Show that the matrix A = [1 2; 2 1] satisfies A² - 2A - 3I = 0."),
                (Hard, "Find the inverse of A = [2 3; 5 7] if it exists."),
                (Hard, "Solve the system: x + y + z = 6, 2x − y + 3z = 14, 3x + 4y − 2z = 2 using matrices."),
                (Challenge, "If A = [cos θ -sin θ; sin θ cos θ], verify that A'A = I and find A⁻¹."),
                (Challenge, "Express the matrix A = [3 2; 4 1] as the sum of a symmetric and a skew-symmetric matrix."),
            ],
        }],
    },
    ChapterSeed {
        order: 5,
        title: "Continuity and Differentiability",
        concepts: &[ConceptSeed {
            slug: "continuity-and-differentiability",
            title: "Continuity and Differentiability",
            description: "Continuity, differentiability, chain rule, derivatives of inverse functions.",
            questions: &[
                (Easy, "Examine the continuity of f(x) = x² at x = 2."),
                (Easy, "Find the derivative of f(x) = x³ + 2x + 1 with respect to x."),
                (Medium, "Discuss the continuity of f(x) = |x| at x = 0."),
                (Medium, "If f(x) = |x − 3|, discuss its differentiability at x = 3."),
                (Hard, "If y = (sin x)^(cos x), find dy/dx."),
                (Hard, "Discuss the continuity and differentiability of f(x) = { x², x ≤ 1; 2x − 1, x > 1 } at x = 1."),
                (Challenge, "If y = e^(ax) sin(bx), prove that d²y/dx² - 2a(dy/dx) + (a²+b²)y = 0."),
                (Challenge, "Find the derivative of f(x) = x^x for x > 0."),
            ],
        }],
    },
];

/// Stable id of a seeded concept
pub fn concept_id(slug: &str) -> String {
    format!("concept-{slug}")
}

fn chapter_id(order: i64) -> String {
    format!("chapter-12-{order}")
}

fn question_id(slug: &str, index: usize) -> String {
    format!("question-{slug}-{}", index + 1)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub concepts: usize,
    pub questions: usize,
    pub new_rows: u64,
}

/// Inserts the demo learner and curriculum; rows that already exist are kept.
pub async fn seed_demo_data(proxy: &DatabaseProxy) -> Result<SeedSummary, sqlx::Error> {
    let mut tx = proxy.pool().begin().await?;
    let mut summary = SeedSummary::default();
    let now = now_iso();

    summary.new_rows += insert_ignore(
        &mut tx,
        r#"INSERT OR IGNORE INTO "users" ("id", "email", "name", "xp", "createdAt") VALUES (?, ?, ?, 0, ?)"#,
        &[DEMO_USER_ID, DEMO_USER_EMAIL, DEMO_USER_NAME, now.as_str()],
    )
    .await?;
    summary.new_rows += insert_ignore(
        &mut tx,
        r#"INSERT OR IGNORE INTO "subjects" ("id", "slug", "name") VALUES (?, ?, ?)"#,
        &[SUBJECT_ID, SUBJECT_SLUG, SUBJECT_NAME],
    )
    .await?;
    summary.new_rows += insert_ignore(
        &mut tx,
        r#"INSERT OR IGNORE INTO "classes" ("id", "subjectId", "name") VALUES (?, ?, ?)"#,
        &[CLASS_ID, SUBJECT_ID, CLASS_NAME],
    )
    .await?;

    for chapter in CHAPTERS {
        let chapter_id = chapter_id(chapter.order);
        summary.new_rows += sqlx::query(
            r#"INSERT OR IGNORE INTO "chapters" ("id", "classId", "title", "order") VALUES (?, ?, ?, ?)"#,
        )
        .bind(&chapter_id)
        .bind(CLASS_ID)
        .bind(chapter.title)
        .bind(chapter.order)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for concept in chapter.concepts {
            let concept_id = concept_id(concept.slug);
            summary.concepts += 1;
            summary.new_rows += insert_ignore(
                &mut tx,
                r#"INSERT OR IGNORE INTO "concepts" ("id", "slug", "title", "description", "chapterId") VALUES (?, ?, ?, ?, ?)"#,
                &[
                    concept_id.as_str(),
                    concept.slug,
                    concept.title,
                    concept.description,
                    chapter_id.as_str(),
                ],
            )
            .await?;

            for (index, &(difficulty, prompt)) in concept.questions.iter().enumerate() {
                summary.questions += 1;
                summary.new_rows += insert_ignore(
                    &mut tx,
                    r#"INSERT OR IGNORE INTO "questions" ("id", "conceptId", "prompt", "difficulty") VALUES (?, ?, ?, ?)"#,
                    &[
                        question_id(concept.slug, index).as_str(),
                        concept_id.as_str(),
                        prompt,
                        difficulty.as_str(),
                    ],
                )
                .await?;
            }
        }
    }

    for (from, to) in RELATIONS {
        summary.new_rows += insert_ignore(
            &mut tx,
            r#"INSERT OR IGNORE INTO "concept_relations" ("id", "fromConceptId", "toConceptId", "createdAt") VALUES (?, ?, ?, ?)"#,
            &[
                format!("relation-{from}-{to}").as_str(),
                concept_id(from).as_str(),
                concept_id(to).as_str(),
                now.as_str(),
            ],
        )
        .await?;
    }

    for (concept, reinforcement) in REINFORCEMENTS {
        summary.new_rows += insert_ignore(
            &mut tx,
            r#"INSERT OR IGNORE INTO "reinforcement_nodes" ("id", "conceptId", "reinforcementConceptId", "createdAt") VALUES (?, ?, ?, ?)"#,
            &[
                format!("reinforcement-{concept}-{reinforcement}").as_str(),
                concept_id(concept).as_str(),
                concept_id(reinforcement).as_str(),
                now.as_str(),
            ],
        )
        .await?;
    }

    tx.commit().await?;
    Ok(summary)
}

async fn insert_ignore(
    conn: &mut SqliteConnection,
    sql: &str,
    binds: &[&str],
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(sql);
    for value in binds {
        query = query.bind(*value);
    }
    Ok(query.execute(conn).await?.rows_affected())
}
