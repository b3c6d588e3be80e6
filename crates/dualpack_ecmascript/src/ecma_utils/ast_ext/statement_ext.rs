use oxc::ast::ast::{
  self, Declaration, Statement, TSModuleDeclarationKind, TSModuleDeclarationName,
};

use crate::BindingPatternExt;

pub trait StatementExt<'ast> {
  /// Source of `import ... from`, `export ... from` and `import x = require(...)`.
  fn module_source(&self) -> Option<&ast::StringLiteral<'ast>>;

  /// Names a top-level statement declares in the module scope, imports excluded.
  fn declared_names(&self) -> Vec<&ast::BindingIdentifier<'ast>>;
}

impl<'ast> StatementExt<'ast> for Statement<'ast> {
  fn module_source(&self) -> Option<&ast::StringLiteral<'ast>> {
    match self {
      Statement::ImportDeclaration(decl) => Some(&decl.source),
      Statement::ExportNamedDeclaration(decl) => decl.source.as_ref(),
      Statement::ExportAllDeclaration(decl) => Some(&decl.source),
      Statement::TSImportEqualsDeclaration(decl) => match &decl.module_reference {
        ast::TSModuleReference::ExternalModuleReference(reference) => Some(&reference.expression),
        _ => None,
      },
      _ => None,
    }
  }

  fn declared_names(&self) -> Vec<&ast::BindingIdentifier<'ast>> {
    match self {
      Statement::ExportNamedDeclaration(decl) => {
        decl.declaration.as_ref().map(declaration_names).unwrap_or_default()
      }
      Statement::ExportDefaultDeclaration(decl) => match &decl.declaration {
        ast::ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
          func.id.iter().collect()
        }
        ast::ExportDefaultDeclarationKind::ClassDeclaration(class) => class.id.iter().collect(),
        ast::ExportDefaultDeclarationKind::TSInterfaceDeclaration(interface) => {
          vec![&interface.id]
        }
        _ => vec![],
      },
      _ => self.as_declaration().map(declaration_names).unwrap_or_default(),
    }
  }
}

fn declaration_names<'a, 'ast>(
  decl: &'a Declaration<'ast>,
) -> Vec<&'a ast::BindingIdentifier<'ast>> {
  match decl {
    Declaration::VariableDeclaration(var) => {
      var.declarations.iter().flat_map(|declarator| declarator.id.binding_identifiers()).collect()
    }
    Declaration::FunctionDeclaration(func) => func.id.iter().collect(),
    Declaration::ClassDeclaration(class) => class.id.iter().collect(),
    Declaration::TSTypeAliasDeclaration(alias) => vec![&alias.id],
    Declaration::TSInterfaceDeclaration(interface) => vec![&interface.id],
    Declaration::TSEnumDeclaration(enum_decl) => vec![&enum_decl.id],
    // `declare global { ... }` augments the global scope, it declares nothing.
    Declaration::TSModuleDeclaration(module)
      if matches!(module.kind, TSModuleDeclarationKind::Global) =>
    {
      vec![]
    }
    Declaration::TSModuleDeclaration(module) => match &module.id {
      TSModuleDeclarationName::Identifier(ident) => vec![ident],
      TSModuleDeclarationName::StringLiteral(_) => vec![],
    },
    Declaration::TSImportEqualsDeclaration(_) => vec![],
  }
}
