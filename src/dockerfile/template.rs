//! Canonical Dockerfiles, one per ecosystem
//!
//! The text is fixed: every service of a given kind gets the same recipe.

use crate::services::EcosystemKind;

/// The standard Dockerfile for one ecosystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalTemplate {
    pub kind: EcosystemKind,
    pub body: &'static str,
}

impl CanonicalTemplate {
    /// First `lines` lines of the template
    pub fn preview(&self, lines: usize) -> Vec<&'static str> {
        self.body.lines().take(lines).collect()
    }
}

pub static NODE_TEMPLATE: CanonicalTemplate = CanonicalTemplate {
    kind: EcosystemKind::Node,
    body: r#"# Node.js multi-stage build
FROM node:18-alpine AS builder
WORKDIR /app
COPY package*.json ./
RUN npm ci --only=production
COPY . .
RUN npm run build || true

FROM node:18-alpine
WORKDIR /app
ENV NODE_ENV=production
COPY --from=builder /app/package*.json ./
COPY --from=builder /app/dist ./dist
COPY --from=builder /app/node_modules ./node_modules
EXPOSE 3000
CMD ["node", "dist/index.js"]
"#,
};

pub static PYTHON_TEMPLATE: CanonicalTemplate = CanonicalTemplate {
    kind: EcosystemKind::Python,
    body: r#"# Python multi-stage (slim)
FROM python:3.11-slim AS base
ENV PYTHONDONTWRITEBYTECODE=1
ENV PYTHONUNBUFFERED=1
WORKDIR /app

# Install system deps
RUN apt-get update && apt-get install -y build-essential libpq-dev --no-install-recommends && rm -rf /var/lib/apt/lists/*

# Create venv and install requirements
FROM base AS builder
COPY pyproject.toml poetry.lock* requirements.txt* /app/
RUN pip install --upgrade pip setuptools wheel
# prefer requirements.txt if present
RUN if [ -f "requirements.txt" ]; then pip install -r requirements.txt; fi

COPY . /app
# If your app needs a build step, add it here (example: compile assets)

FROM base
COPY --from=builder /usr/local /usr/local
COPY . /app
EXPOSE 8000
CMD ["gunicorn", "-k", "uvicorn.workers.UvicornWorker", "app.main:app", "--bind", "0.0.0.0:8000"]
"#,
};

/// Template for a kind; `Unknown` has none
pub fn template_for(kind: EcosystemKind) -> Option<&'static CanonicalTemplate> {
    match kind {
        EcosystemKind::Node => Some(&NODE_TEMPLATE),
        EcosystemKind::Python => Some(&PYTHON_TEMPLATE),
        EcosystemKind::Unknown => None,
    }
}
