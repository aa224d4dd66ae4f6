//! Shader management.
//!
//! WGSL sources are embedded at compile time. Sources may contain
//! `{{NAME}}` placeholders that are filled in before the module is created;
//! the object shader uses one for its light array length.

use crate::error::{RenderError, RenderResult};

/// Builder for creating shader modules.
pub struct ShaderBuilder {
    vertex_source: Option<String>,
    fragment_source: Option<String>,
    defines: Vec<(String, String)>,
    label: Option<String>,
}

impl ShaderBuilder {
    /// Creates a new shader builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertex_source: None,
            fragment_source: None,
            defines: Vec::new(),
            label: None,
        }
    }

    /// Sets the vertex shader source (WGSL).
    #[must_use]
    pub fn with_vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex_source = Some(source.into());
        self
    }

    /// Sets the fragment shader source (WGSL).
    #[must_use]
    pub fn with_fragment(mut self, source: impl Into<String>) -> Self {
        self.fragment_source = Some(source.into());
        self
    }

    /// Uses one WGSL file for both stages.
    #[must_use]
    pub fn with_source(self, source: impl Into<String>) -> Self {
        let source = source.into();
        self.with_vertex(source.clone()).with_fragment(source)
    }

    /// Replaces every `{{name}}` with `value`.
    #[must_use]
    pub fn with_define(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.defines.push((name.into(), value.to_string()));
        self
    }

    /// Sets the shader label for debugging.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builds the shader module (does not create pipeline).
    pub fn build_module(self, device: &wgpu::Device) -> RenderResult<wgpu::ShaderModule> {
        let source = self.source()?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: self.label.as_deref(),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Ok(module)
    }

    /// Returns the final WGSL text with all placeholders substituted.
    pub fn source(&self) -> RenderResult<String> {
        let mut source = self.combined_source()?;
        for (name, value) in &self.defines {
            source = source.replace(&format!("{{{{{name}}}}}"), value);
        }

        if let Some(start) = source.find("{{") {
            let rest = &source[start..];
            let end = rest.find("}}").map_or(rest.len(), |e| e + 2);
            return Err(RenderError::ShaderCompilationFailed(format!(
                "unresolved template parameter {}",
                &rest[..end]
            )));
        }
        Ok(source)
    }

    fn combined_source(&self) -> RenderResult<String> {
        let vertex = self
            .vertex_source
            .as_ref()
            .ok_or_else(|| RenderError::ShaderCompilationFailed("missing vertex shader".into()))?;

        let fragment = self.fragment_source.as_ref().ok_or_else(|| {
            RenderError::ShaderCompilationFailed("missing fragment shader".into())
        })?;

        // If sources are the same file, just return one
        if vertex == fragment {
            return Ok(vertex.clone());
        }

        Ok(format!("{vertex}\n\n{fragment}"))
    }
}

impl Default for ShaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
